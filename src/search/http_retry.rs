//! Retry policy shared by the collaborator HTTP clients.
//!
//! Throttling (429), server errors (5xx) and transient transport failures are
//! retried with capped exponential backoff. Everything else fails at once.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};

/// Final failure of a request after its retry budget.
#[derive(Debug)]
pub(crate) enum SendError {
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
}

/// Sends the request produced by `build`, retrying up to `max_retries` times
/// after the first attempt. `service` only labels log events.
pub(crate) async fn send_with_retry<F>(
    build: F,
    max_retries: usize,
    service: &str,
) -> Result<Response, SendError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0usize;
    loop {
        match build().send().await {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<body unavailable>".to_string());
                if should_retry(status) && attempt < max_retries {
                    attempt += 1;
                    tracing::debug!(service, %status, attempt, "retrying request");
                    tokio::time::sleep(retry_backoff(attempt)).await;
                    continue;
                }
                return Err(SendError::Status { status, body });
            }
            Err(err) => {
                if is_retryable_error(&err) && attempt < max_retries {
                    attempt += 1;
                    tracing::debug!(service, error = %err, attempt, "retrying request");
                    tokio::time::sleep(retry_backoff(attempt)).await;
                    continue;
                }
                return Err(SendError::Transport(err));
            }
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn retries_only_throttling_and_server_errors() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
        assert!(!should_retry(StatusCode::UNAUTHORIZED));
        assert!(!should_retry(StatusCode::NOT_FOUND));
    }

    #[test]
    fn backoff_grows_then_caps() {
        assert!(retry_backoff(1) < retry_backoff(2));
        assert_eq!(retry_backoff(9), retry_backoff(5));
    }

    #[tokio::test]
    async fn recovers_within_retry_budget() {
        let (url, hits) = stub::serve(vec![(503, "{}"), (503, "{}"), (200, r#"{"ok":true}"#)]).await;
        let http = client();
        let resp = send_with_retry(|| http.get(&url), 2, "stub").await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let (url, hits) = stub::serve(vec![(503, "busy"), (503, "busy"), (200, "{}")]).await;
        let http = client();
        let err = send_with_retry(|| http.get(&url), 1, "stub").await.unwrap_err();
        match err {
            SendError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "busy");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_sends_once() {
        let (url, hits) = stub::serve(vec![(429, "{}"), (200, "{}")]).await;
        let http = client();
        assert!(send_with_retry(|| http.get(&url), 0, "stub").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_errors_fail_immediately() {
        let (url, hits) = stub::serve(vec![(401, "unauthorized"), (200, "{}")]).await;
        let http = client();
        let err = send_with_retry(|| http.get(&url), 3, "stub").await.unwrap_err();
        assert!(matches!(err, SendError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
