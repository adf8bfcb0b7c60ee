//! theme-scout library
//!
//! Turns a free-text investment theme into a ranked list of listed
//! companies, boosted by related news.
//!
//! # Modules
//!
//! - `search`: embedding, dual vector retrieval, news aggregation, score fusion
//! - `config`: environment-driven settings
//! - `error`: classified failures for the calling boundary
//! - `http`: JSON API over the recommender (feature `http`)

pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod search;

// Re-exports for convenience
pub use config::Settings;
pub use error::{EmbeddingError, IndexError, RecommendError};
pub use search::{
    Embedder, FusionWeights, HybridRanker, LiveRecommender, RankedResult, Recommender,
    VectorIndex,
};
