//! Score fusion and ranking.
//!
//! Each company's own similarity is blended with the best similarity among
//! news about it:
//!
//! ```text
//! combined = company_weight * company_score + news_weight * news_max_score
//! ```
//!
//! Companies without any news keep their company score unchanged. The
//! weights were tuned against one index configuration; changing the
//! similarity metric of either collection invalidates them.

use serde::Serialize;

use super::aggregate::NewsAggregates;
use super::candidate::{CompanyCandidate, CompanyPayload, NewsPayload, PointId};

/// Weights of the fusion rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub company: f64,
    pub news: f64,
}

impl FusionWeights {
    pub const DEFAULT: Self = Self {
        company: 0.6,
        news: 0.4,
    };

    /// Blends a company score with its issuer's news signal.
    pub fn combine(&self, company_score: f64, news_max_score: Option<f64>) -> f64 {
        match news_max_score {
            Some(news) => self.company * company_score + self.news * news,
            None => company_score,
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One entry of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub id: PointId,
    /// Company similarity as returned by the index.
    pub score: f64,
    pub payload: CompanyPayload,
    /// Best news similarity for the issuer, 0 when there is none.
    pub news_score: f64,
    pub news_count: usize,
    pub combined_score: f64,
    pub relevant_news: Vec<NewsPayload>,
}

impl RankedResult {
    pub fn has_news(&self) -> bool {
        self.news_count > 0
    }
}

/// Fuses company candidates with news aggregates and returns the top `k`.
///
/// Sorting is stable, so exact ties keep the order the company index
/// returned them in.
pub fn fuse_and_rank(
    companies: Vec<CompanyCandidate>,
    aggregates: &NewsAggregates,
    weights: &FusionWeights,
    k: usize,
) -> Vec<RankedResult> {
    let mut ranked: Vec<RankedResult> = companies
        .into_iter()
        .map(|company| {
            let aggregate = company
                .payload
                .ticker_key()
                .and_then(|ticker| aggregates.get(&ticker));
            let combined_score = weights.combine(company.score, aggregate.map(|a| a.max_score));
            RankedResult {
                id: company.id,
                score: company.score,
                payload: company.payload,
                news_score: aggregate.map_or(0.0, |a| a.max_score),
                news_count: aggregate.map_or(0, |a| a.count),
                combined_score,
                relevant_news: aggregate.map(|a| a.articles.clone()).unwrap_or_default(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    ranked.truncate(k);
    ranked
}
