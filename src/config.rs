//! Runtime configuration.
//!
//! [`Settings`] is read from environment variables on startup and validated
//! once. Defaults match the collections and embedding model the fusion
//! weights were tuned against.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// Connection and request settings for the recommender.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Key for the embedding service. Required for live queries.
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    pub embedding_model: String,
    /// Expected vector length; must match both collections.
    pub embedding_dimensions: Option<usize>,
    /// Qdrant host name. Required for live queries.
    pub qdrant_host: Option<String>,
    pub qdrant_port: u16,
    pub qdrant_https: bool,
    #[serde(skip)]
    pub qdrant_api_key: Option<String>,
    pub companies_collection: String,
    pub news_collection: String,
    /// Per-request HTTP timeout for both collaborators.
    pub timeout_seconds: u64,
    /// Retries after the first attempt for throttled, 5xx or transient
    /// transport failures. 0 disables retrying.
    pub max_retries: usize,
    /// Result count when the caller does not specify one.
    pub default_limit: usize,
    /// Upper bound for caller-supplied result counts.
    pub max_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: Some(1536),
            qdrant_host: None,
            qdrant_port: 6333,
            qdrant_https: false,
            qdrant_api_key: None,
            companies_collection: "companies_v2".to_string(),
            news_collection: "news_v4".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            default_limit: 10,
            max_limit: 50,
        }
    }
}

impl Settings {
    /// Loads settings from the process environment and validates them.
    pub fn from_env() -> Result<Self> {
        let settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Builds settings from an arbitrary key lookup, starting from defaults.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut settings = Self::default();

        settings.openai_api_key = get("OPENAI_API_KEY");
        if let Some(v) = get("SCOUT_OPENAI_BASE") {
            settings.openai_base_url = v;
        }
        if let Some(v) = get("SCOUT_EMBEDDING_MODEL") {
            settings.embedding_model = v;
        }
        if let Some(v) = get("SCOUT_EMBEDDING_DIMENSIONS") {
            let dims: usize = parse("SCOUT_EMBEDDING_DIMENSIONS", &v)?;
            settings.embedding_dimensions = (dims > 0).then_some(dims);
        }
        settings.qdrant_host = get("QDRANT_HOST");
        if let Some(v) = get("QDRANT_PORT") {
            settings.qdrant_port = parse("QDRANT_PORT", &v)?;
        }
        if let Some(v) = get("QDRANT_HTTPS") {
            settings.qdrant_https = parse_bool("QDRANT_HTTPS", &v)?;
        }
        settings.qdrant_api_key = get("QDRANT_API_KEY");
        if let Some(v) = get("SCOUT_COMPANIES_COLLECTION") {
            settings.companies_collection = v;
        }
        if let Some(v) = get("SCOUT_NEWS_COLLECTION") {
            settings.news_collection = v;
        }
        if let Some(v) = get("SCOUT_TIMEOUT_SECS") {
            settings.timeout_seconds = parse("SCOUT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("SCOUT_MAX_RETRIES") {
            settings.max_retries = parse("SCOUT_MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("SCOUT_DEFAULT_LIMIT") {
            settings.default_limit = parse("SCOUT_DEFAULT_LIMIT", &v)?;
        }
        if let Some(v) = get("SCOUT_MAX_LIMIT") {
            settings.max_limit = parse("SCOUT_MAX_LIMIT", &v)?;
        }

        Ok(settings)
    }

    /// Checks:
    /// - `default_limit` and `max_limit` are positive and ordered
    /// - `timeout_seconds` is positive
    /// - collection names are non-empty
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.default_limit > 0, "default_limit must be greater than 0");
        anyhow::ensure!(self.max_limit > 0, "max_limit must be greater than 0");
        anyhow::ensure!(
            self.default_limit <= self.max_limit,
            "default_limit must be <= max_limit"
        );
        anyhow::ensure!(self.timeout_seconds > 0, "timeout_seconds must be greater than 0");
        anyhow::ensure!(
            !self.companies_collection.trim().is_empty(),
            "companies collection name is required"
        );
        anyhow::ensure!(
            !self.news_collection.trim().is_empty(),
            "news collection name is required"
        );
        Ok(())
    }

    /// Base URL of the Qdrant REST API.
    pub fn qdrant_url(&self) -> Result<String> {
        let host = self
            .qdrant_host
            .as_deref()
            .context("QDRANT_HOST environment variable is not set")?;
        if host.starts_with("http://") || host.starts_with("https://") {
            return Ok(host.trim_end_matches('/').to_string());
        }
        let scheme = if self.qdrant_https { "https" } else { "http" };
        Ok(format!("{}://{}:{}", scheme, host, self.qdrant_port))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolves a caller-supplied result count: default when absent,
    /// clamped to `1..=max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid value for {}: {:?}", key, raw))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("invalid value for {}: {:?}", key, raw),
    }
}
