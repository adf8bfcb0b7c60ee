//! Dual candidate retrieval.
//!
//! Companies and news are fetched concurrently from their own indexes. The
//! stage is all-or-nothing: if either search fails the whole retrieval fails
//! and the other result is dropped.

use std::collections::HashSet;
use std::future::Future;

use super::candidate::{decode_all, CompanyCandidate, CompanyPayload, NewsCandidate, NewsPayload};
use super::vectordb::VectorIndex;
use crate::error::RecommendError;

/// Company candidates fetched per requested result.
pub const COMPANY_OVERSAMPLING: usize = 2;

/// Fixed news cap, independent of the requested result count.
pub const NEWS_CANDIDATE_LIMIT: usize = 50;

/// Both candidate pools for one query.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub companies: Vec<CompanyCandidate>,
    pub news: Vec<NewsCandidate>,
}

/// Runs two independent futures concurrently and waits for both.
///
/// Resolves to the first error if either fails; the other future is dropped
/// at that point.
pub async fn join_both<A, B, E>(
    left: impl Future<Output = Result<A, E>>,
    right: impl Future<Output = Result<B, E>>,
) -> Result<(A, B), E> {
    tokio::try_join!(left, right)
}

/// Fetches company and news candidates for `vector`.
///
/// Requests `COMPANY_OVERSAMPLING * k` companies and [`NEWS_CANDIDATE_LIMIT`]
/// news items.
pub async fn retrieve_candidates<C, N>(
    company_index: &C,
    news_index: &N,
    vector: &[f32],
    k: usize,
) -> Result<Candidates, RecommendError>
where
    C: VectorIndex,
    N: VectorIndex,
{
    let company_limit = k.saturating_mul(COMPANY_OVERSAMPLING);
    let company_search = async {
        company_index
            .search(vector, company_limit)
            .await
            .map_err(RecommendError::from)
    };
    let news_search = async {
        news_index
            .search(vector, NEWS_CANDIDATE_LIMIT)
            .await
            .map_err(RecommendError::from)
    };

    let (company_points, news_points) = join_both(company_search, news_search)
        .await
        .inspect_err(|err| tracing::warn!(error = %err, "candidate retrieval failed"))?;

    tracing::debug!(
        companies = company_points.len(),
        news = news_points.len(),
        "retrieved candidates"
    );

    let companies = decode_all::<CompanyPayload>(company_points, company_index.collection())?;
    ensure_unique_ids(&companies)?;
    let news = decode_all::<NewsPayload>(news_points, news_index.collection())?;

    Ok(Candidates { companies, news })
}

fn ensure_unique_ids(companies: &[CompanyCandidate]) -> Result<(), RecommendError> {
    let mut seen = HashSet::with_capacity(companies.len());
    for candidate in companies {
        if !seen.insert(&candidate.id) {
            return Err(RecommendError::DataIntegrity(format!(
                "company id {} returned more than once",
                candidate.id
            )));
        }
    }
    Ok(())
}
