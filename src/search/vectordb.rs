//! Vector index access
//!
//! [`VectorIndex`] is the seam to the nearest-neighbor service. [`QdrantIndex`]
//! implements it against the Qdrant REST API, one instance per collection.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::candidate::ScoredPoint;
use super::http_retry::{send_with_retry, SendError};
use crate::config::Settings;
use crate::error::IndexError;

/// A similarity-searchable collection.
pub trait VectorIndex: Send + Sync {
    /// Collection name, used in logs and errors.
    fn collection(&self) -> &str;

    /// Returns up to `limit` points ordered by descending similarity,
    /// payloads included.
    fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ScoredPoint>, IndexError>> + Send;
}

/// Qdrant REST client bound to one collection.
#[derive(Clone)]
pub struct QdrantIndex {
    client: Client,
    endpoint: String,
    collection: String,
    max_retries: usize,
}

impl QdrantIndex {
    /// Builds a client for `collection` on the Qdrant server at `base_url`.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        collection: &str,
        timeout: Duration,
        max_retries: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "Qdrant URL must be an http(s) URL"
        );
        anyhow::ensure!(!collection.trim().is_empty(), "collection name is required");
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key).context("invalid Qdrant API key")?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Qdrant HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/collections/{}/points/search",
                base_url.trim_end_matches('/'),
                collection
            ),
            collection: collection.to_string(),
            max_retries,
        })
    }

    /// Client for the companies collection.
    pub fn companies(settings: &Settings) -> anyhow::Result<Self> {
        Self::from_settings(settings, &settings.companies_collection)
    }

    /// Client for the news collection.
    pub fn news(settings: &Settings) -> anyhow::Result<Self> {
        Self::from_settings(settings, &settings.news_collection)
    }

    fn from_settings(settings: &Settings, collection: &str) -> anyhow::Result<Self> {
        Self::new(
            &settings.qdrant_url()?,
            settings.qdrant_api_key.as_deref(),
            collection,
            settings.timeout(),
            settings.max_retries,
        )
    }

    fn malformed(&self, message: impl Into<String>) -> IndexError {
        IndexError::Malformed {
            collection: self.collection.clone(),
            message: message.into(),
        }
    }
}

impl VectorIndex for QdrantIndex {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };
        let resp = send_with_retry(
            || self.client.post(&self.endpoint).json(&request),
            self.max_retries,
            &self.collection,
        )
        .await
        .map_err(|err| match err {
            SendError::Status { status, body } => IndexError::Status {
                collection: self.collection.clone(),
                status: status.as_u16(),
                body,
            },
            SendError::Transport(err) => IndexError::Transport {
                collection: self.collection.clone(),
                message: err.to_string(),
            },
        })?;

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| self.malformed(e.to_string()))?;
        Ok(parsed.result)
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}
