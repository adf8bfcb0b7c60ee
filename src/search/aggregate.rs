//! Per-issuer news aggregation.

use std::collections::HashMap;

use super::candidate::{NewsCandidate, NewsPayload};

/// News signal for one issuer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsAggregate {
    /// Highest similarity among the issuer's articles.
    pub max_score: f64,
    /// Number of articles attributed to the issuer.
    pub count: usize,
    /// Articles in retrieval order.
    pub articles: Vec<NewsPayload>,
}

impl NewsAggregate {
    fn new(score: f64, article: NewsPayload) -> Self {
        Self {
            max_score: score,
            count: 1,
            articles: vec![article],
        }
    }

    fn absorb(&mut self, score: f64, article: NewsPayload) {
        self.max_score = self.max_score.max(score);
        self.count += 1;
        self.articles.push(article);
    }
}

/// Request-scoped mapping from normalized ticker to its news aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsAggregates {
    by_ticker: HashMap<String, NewsAggregate>,
}

impl NewsAggregates {
    /// Looks up the aggregate for an already-normalized ticker.
    pub fn get(&self, ticker: &str) -> Option<&NewsAggregate> {
        self.by_ticker.get(ticker)
    }

    /// Number of issuers with at least one article.
    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.by_ticker.keys().map(String::as_str)
    }
}

/// Groups news candidates by issuer ticker.
///
/// Candidates without a usable ticker are skipped so they can never attach
/// to a company.
pub fn aggregate_news<I>(candidates: I) -> NewsAggregates
where
    I: IntoIterator<Item = NewsCandidate>,
{
    let mut by_ticker: HashMap<String, NewsAggregate> = HashMap::new();
    let mut skipped = 0usize;

    for candidate in candidates {
        let Some(ticker) = candidate.payload.ticker_key() else {
            skipped += 1;
            continue;
        };
        match by_ticker.get_mut(&ticker) {
            Some(existing) => existing.absorb(candidate.score, candidate.payload),
            None => {
                by_ticker.insert(ticker, NewsAggregate::new(candidate.score, candidate.payload));
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "dropped news without issuer ticker");
    }

    NewsAggregates { by_ticker }
}
