//! Recommendation engine - embeds a theme and ranks companies by fused
//! company and news similarity.

use std::time::Instant;

use super::aggregate::aggregate_news;
use super::embedding::{Embedder, OpenAiEmbedder};
use super::fusion::{fuse_and_rank, FusionWeights, RankedResult};
use super::retrieval::retrieve_candidates;
use super::vectordb::{QdrantIndex, VectorIndex};
use crate::config::Settings;
use crate::error::{RecommendError, Result};

/// Result count used when the caller does not ask for one.
pub const DEFAULT_RESULT_COUNT: usize = 10;

/// Hybrid ranking over a companies index and a news index.
pub struct HybridRanker<C, N> {
    companies: C,
    news: N,
    weights: FusionWeights,
}

impl<C: VectorIndex, N: VectorIndex> HybridRanker<C, N> {
    pub fn new(companies: C, news: N) -> Self {
        Self {
            companies,
            news,
            weights: FusionWeights::DEFAULT,
        }
    }

    pub fn with_weights(mut self, weights: FusionWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    pub fn companies(&self) -> &C {
        &self.companies
    }

    pub fn news(&self) -> &N {
        &self.news
    }

    /// Ranks companies for a query vector, returning at most `k` results.
    ///
    /// `k` defaults to [`DEFAULT_RESULT_COUNT`].
    pub async fn rank(&self, vector: &[f32], k: Option<usize>) -> Result<Vec<RankedResult>> {
        if vector.is_empty() {
            return Err(RecommendError::InvalidInput("query vector is empty".into()));
        }
        let k = k.unwrap_or(DEFAULT_RESULT_COUNT);
        if k == 0 {
            return Err(RecommendError::InvalidInput(
                "result count must be greater than 0".into(),
            ));
        }

        let candidates = retrieve_candidates(&self.companies, &self.news, vector, k).await?;
        let aggregates = aggregate_news(candidates.news);
        tracing::debug!(issuers = aggregates.len(), "aggregated news");

        Ok(fuse_and_rank(candidates.companies, &aggregates, &self.weights, k))
    }
}

/// Text-in entry point: validates the theme, embeds it, and ranks.
pub struct Recommender<E, C, N> {
    embedder: E,
    ranker: HybridRanker<C, N>,
}

/// Recommender wired to the live OpenAI and Qdrant services.
pub type LiveRecommender = Recommender<OpenAiEmbedder, QdrantIndex, QdrantIndex>;

impl LiveRecommender {
    /// Builds clients for both collaborators from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let embedder = OpenAiEmbedder::from_settings(settings)?;
        let ranker = HybridRanker::new(QdrantIndex::companies(settings)?, QdrantIndex::news(settings)?);
        Ok(Recommender::new(embedder, ranker))
    }
}

impl<E: Embedder, C: VectorIndex, N: VectorIndex> Recommender<E, C, N> {
    pub fn new(embedder: E, ranker: HybridRanker<C, N>) -> Self {
        Self { embedder, ranker }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn ranker(&self) -> &HybridRanker<C, N> {
        &self.ranker
    }

    /// Recommends companies for a free-text investment theme.
    ///
    /// Blank queries are rejected before any collaborator is called. An
    /// embedding failure is reported as [`RecommendError::Embedding`] and no
    /// search is issued.
    pub async fn recommend(&self, query: &str, k: Option<usize>) -> Result<Vec<RankedResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecommendError::InvalidInput("query cannot be empty".into()));
        }
        if k == Some(0) {
            return Err(RecommendError::InvalidInput(
                "result count must be greater than 0".into(),
            ));
        }

        let start = Instant::now();
        tracing::debug!(query, "embedding query");
        let vector = self
            .embedder
            .embed(query)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "embedding failed"))?;

        let results = self.ranker.rank(&vector, k).await?;
        tracing::info!(
            results = results.len(),
            with_news = results.iter().filter(|r| r.has_news()).count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "recommendation complete"
        );
        Ok(results)
    }
}
