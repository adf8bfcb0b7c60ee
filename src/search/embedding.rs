//! Query embedding
//!
//! [`Embedder`] is the seam to the embedding service. [`OpenAiEmbedder`]
//! talks to any OpenAI-compatible `/embeddings` endpoint.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_retry::{send_with_retry, SendError};
use crate::config::Settings;
use crate::error::EmbeddingError;

/// Turns text into a fixed-dimension vector.
pub trait Embedder: Send + Sync {
    /// Embed a single non-empty text.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;
}

/// Async client for OpenAI-compatible embedding endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
}

impl OpenAiEmbedder {
    /// Builds a new embeddings client.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimensions: Option<usize>,
        timeout: Duration,
        max_retries: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid OpenAI API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.trim().to_string(),
            dimensions,
            max_retries,
        })
    }

    /// Builds the client from application settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings
            .openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY is not set")?;
        Self::new(
            api_key,
            &settings.openai_base_url,
            &settings.embedding_model,
            settings.embedding_dimensions,
            settings.timeout(),
            settings.max_retries,
        )
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), EmbeddingError> {
        if embedding.is_empty() {
            return Err(EmbeddingError::Malformed("empty embedding vector".into()));
        }
        match self.dimensions {
            Some(expected) if expected != embedding.len() => Err(EmbeddingError::Malformed(
                format!("expected {} dimensions, got {}", expected, embedding.len()),
            )),
            _ => Ok(()),
        }
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = text.trim();
        if input.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input,
            dimensions: self.dimensions,
        };
        let resp = send_with_retry(
            || self.client.post(&self.endpoint).json(&request),
            self.max_retries,
            "embeddings",
        )
        .await
        .map_err(|err| match err {
            SendError::Status { status, body } => EmbeddingError::Status {
                status: status.as_u16(),
                body,
            },
            SendError::Transport(err) => EmbeddingError::Transport(err.to_string()),
        })?;

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;
        let embedding = parsed
            .data
            .into_iter()
            .min_by_key(|entry| entry.index)
            .map(|entry| entry.embedding)
            .ok_or_else(|| EmbeddingError::Malformed("response contained no embeddings".into()))?;
        self.check_dimensions(&embedding)?;
        Ok(embedding)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
