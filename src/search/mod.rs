//! Hybrid search over companies and news
//!
//! Stage 1: concurrent candidate retrieval from both collections
//! Stage 2: per-issuer news aggregation
//! Stage 3: score fusion and ranking

pub mod aggregate;
pub mod candidate;
pub mod embedding;
pub mod engine;
pub mod fusion;
mod http_retry;
pub mod retrieval;
pub mod vectordb;

pub use aggregate::{aggregate_news, NewsAggregate, NewsAggregates};
pub use candidate::{
    CompanyCandidate, CompanyPayload, NewsCandidate, NewsPayload, PointId, ScoredPoint,
};
pub use embedding::{Embedder, OpenAiEmbedder};
pub use engine::{HybridRanker, LiveRecommender, Recommender, DEFAULT_RESULT_COUNT};
pub use fusion::{fuse_and_rank, FusionWeights, RankedResult};
pub use retrieval::{join_both, retrieve_candidates, Candidates};
pub use vectordb::{QdrantIndex, VectorIndex};
