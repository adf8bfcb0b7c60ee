//! Record types for retrieved candidates and their payloads.
//!
//! Vector indexes hand back loosely-typed JSON payloads. Everything that
//! reaches scoring goes through [`decode`] first, which rejects points whose
//! payload is missing or does not match the expected record shape.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecommendError;

/// Point identifier as assigned by the index: an integer or a UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Uuid(s) => f.write_str(s),
        }
    }
}

/// Raw search hit as returned by a [`VectorIndex`](super::vectordb::VectorIndex).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f64,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

/// Company record stored in the companies collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPayload {
    /// Display name.
    pub name: String,
    /// Exchange ticker, the join key against news.
    #[serde(default)]
    pub nse: Option<String>,
    /// Free-text business description.
    #[serde(default)]
    pub company: String,
}

impl CompanyPayload {
    /// Normalized join key, `None` when the ticker is blank.
    pub fn ticker_key(&self) -> Option<String> {
        normalize_ticker(self.nse.as_deref())
    }
}

/// News record stored in the news collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPayload {
    /// Ticker of the issuer the article is about.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Issuer name.
    #[serde(default)]
    pub company: String,
    /// Short headline.
    pub specific_title: String,
    /// Long-form summary.
    #[serde(default)]
    pub long_summary: String,
}

impl NewsPayload {
    /// Normalized issuer key, `None` when the ticker is blank or missing.
    pub fn ticker_key(&self) -> Option<String> {
        normalize_ticker(self.symbol.as_deref())
    }
}

/// A decoded search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate<P> {
    pub id: PointId,
    pub score: f64,
    pub payload: P,
}

pub type CompanyCandidate = Candidate<CompanyPayload>;
pub type NewsCandidate = Candidate<NewsPayload>;

/// Upper-cases a ticker for joining. Blank tickers have no key.
pub fn normalize_ticker(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Decodes a raw point into a typed candidate.
///
/// Fails with [`RecommendError::DataIntegrity`] when the payload is absent or
/// does not deserialize into `P`.
pub fn decode<P: DeserializeOwned>(
    point: ScoredPoint,
    collection: &str,
) -> Result<Candidate<P>, RecommendError> {
    let ScoredPoint { id, score, payload } = point;
    let payload = payload.ok_or_else(|| {
        RecommendError::DataIntegrity(format!("point {} in {} has no payload", id, collection))
    })?;
    let payload = serde_json::from_value(Value::Object(payload)).map_err(|e| {
        RecommendError::DataIntegrity(format!(
            "point {} in {} has a malformed payload: {}",
            id, collection, e
        ))
    })?;
    Ok(Candidate { id, score, payload })
}

/// Decodes every point, stopping at the first malformed one.
pub fn decode_all<P: DeserializeOwned>(
    points: Vec<ScoredPoint>,
    collection: &str,
) -> Result<Vec<Candidate<P>>, RecommendError> {
    points
        .into_iter()
        .map(|point| decode(point, collection))
        .collect()
}
