//! End-to-end tests for the recommend pipeline.
//!
//! Collaborators are in-memory fakes: the embedder returns a fixed vector
//! and each index replays canned points while recording the limits it was
//! asked for. No network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};
use theme_scout::error::{EmbeddingError, IndexError};
use theme_scout::search::{
    Embedder, HybridRanker, PointId, Recommender, ScoredPoint, VectorIndex,
};
use theme_scout::RecommendError;

struct FakeEmbedder {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(EmbeddingError::Transport("connection reset".into()))
        } else {
            Ok(vec![0.25; 8])
        }
    }
}

struct FakeIndex {
    name: &'static str,
    points: Vec<ScoredPoint>,
    fail: bool,
    limits: Mutex<Vec<usize>>,
}

impl FakeIndex {
    fn new(name: &'static str, points: Vec<ScoredPoint>) -> Self {
        Self {
            name,
            points,
            fail: false,
            limits: Mutex::new(Vec::new()),
        }
    }

    fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, Vec::new())
        }
    }

    fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

impl VectorIndex for FakeIndex {
    fn collection(&self) -> &str {
        self.name
    }

    async fn search(&self, _vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        self.limits.lock().unwrap().push(limit);
        if self.fail {
            return Err(IndexError::Status {
                collection: self.name.to_string(),
                status: 500,
                body: "internal".into(),
            });
        }
        Ok(self.points.iter().take(limit).cloned().collect())
    }
}

fn point(id: u64, score: f64, payload: Value) -> ScoredPoint {
    ScoredPoint {
        id: PointId::Num(id),
        score,
        payload: payload.as_object().cloned(),
    }
}

fn company(id: u64, ticker: &str, score: f64) -> ScoredPoint {
    point(
        id,
        score,
        json!({"name": format!("Company {id}"), "nse": ticker, "company": "Listed business"}),
    )
}

fn news(id: u64, symbol: &str, score: f64) -> ScoredPoint {
    point(
        id,
        score,
        json!({
            "symbol": symbol,
            "company": "Issuer",
            "specific_title": format!("Article {id}"),
            "long_summary": "Summary"
        }),
    )
}

fn companies_index(points: Vec<ScoredPoint>) -> FakeIndex {
    FakeIndex::new("companies_v2", points)
}

fn news_index(points: Vec<ScoredPoint>) -> FakeIndex {
    FakeIndex::new("news_v4", points)
}

#[tokio::test]
async fn company_without_news_keeps_company_score() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(1, "ABC", 0.90)]),
        news_index(vec![news(100, "DEF", 0.99)]),
    );
    let results = ranker.rank(&[0.1, 0.2], None).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].combined_score, 0.90);
    assert_eq!(results[0].news_count, 0);
}

#[tokio::test]
async fn news_for_issuer_is_fused_case_insensitively() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(2, "XYZ", 0.70)]),
        news_index(vec![news(100, "xyz", 0.95), news(101, "xyz", 0.80)]),
    );
    let results = ranker.rank(&[0.1, 0.2], None).await.unwrap();

    let top = &results[0];
    assert!((top.news_score - 0.95).abs() < 1e-9);
    assert_eq!(top.news_count, 2);
    assert!((top.combined_score - 0.80).abs() < 1e-9);
    assert_eq!(top.relevant_news[0].specific_title, "Article 100");
    assert_eq!(top.relevant_news[1].specific_title, "Article 101");
}

#[tokio::test]
async fn oversampled_companies_truncate_to_k() {
    let companies: Vec<_> = (0..15)
        .map(|i| company(i, &format!("T{i:02}"), 0.80 - i as f64 * 0.02))
        .collect();
    let news = vec![
        news(200, "T14", 0.99),
        news(201, "T13", 0.90),
        news(202, "t12", 0.85),
        news(203, "T12", 0.30),
    ];
    let ranker = HybridRanker::new(companies_index(companies), news_index(news));
    let results = ranker.rank(&[0.5], Some(10)).await.unwrap();

    assert_eq!(results.len(), 10);
    assert!(results
        .windows(2)
        .all(|w| w[0].combined_score >= w[1].combined_score));
    assert!(results.iter().filter(|r| r.has_news()).count() <= 3);
}

#[tokio::test]
async fn retrieval_limits_follow_k() {
    let companies = companies_index(Vec::new());
    let news = news_index(Vec::new());
    let ranker = HybridRanker::new(companies, news);
    ranker.rank(&[0.5], Some(7)).await.unwrap();
    ranker.rank(&[0.5], None).await.unwrap();

    let (company_limits, news_limits) = limits_of(&ranker);
    assert_eq!(company_limits, [14, 20]);
    assert_eq!(news_limits, [50, 50]);
}

fn limits_of(ranker: &HybridRanker<FakeIndex, FakeIndex>) -> (Vec<usize>, Vec<usize>) {
    (ranker.companies().limits(), ranker.news().limits())
}

#[tokio::test]
async fn blank_news_ticker_never_matches_blank_company_ticker() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(1, "", 0.40), company(2, "ABC", 0.50)]),
        news_index(vec![
            news(100, "", 0.99),
            point(101, 0.98, json!({"specific_title": "No issuer"})),
            news(102, "abc", 0.60),
        ]),
    );
    let results = ranker.rank(&[0.5], None).await.unwrap();

    let blank = results.iter().find(|r| r.id == PointId::Num(1)).unwrap();
    assert_eq!(blank.combined_score, 0.40);
    assert_eq!(blank.news_count, 0);

    let abc = results.iter().find(|r| r.id == PointId::Num(2)).unwrap();
    assert_eq!(abc.news_count, 1);
    assert!((abc.combined_score - (0.6 * 0.50 + 0.4 * 0.60)).abs() < 1e-9);
}

#[tokio::test]
async fn zero_companies_is_an_empty_success() {
    let ranker = HybridRanker::new(
        companies_index(Vec::new()),
        news_index(vec![news(1, "ABC", 0.9)]),
    );
    let results = ranker.rank(&[0.5], None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn embedding_failure_skips_retrieval() {
    let recommender = Recommender::new(
        FakeEmbedder::failing(),
        HybridRanker::new(
            companies_index(vec![company(1, "ABC", 0.9)]),
            news_index(Vec::new()),
        ),
    );
    let err = recommender
        .recommend("water treatment", None)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendError::Embedding(_)));
    assert_eq!(err.code(), "EMBEDDING_FAILED");
    let (company_limits, news_limits) = limits_of(recommender.ranker());
    assert!(company_limits.is_empty());
    assert!(news_limits.is_empty());
}

#[tokio::test]
async fn blank_query_is_rejected_before_embedding() {
    let recommender = Recommender::new(
        FakeEmbedder::ok(),
        HybridRanker::new(companies_index(Vec::new()), news_index(Vec::new())),
    );
    let err = recommender.recommend("   ", None).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");
    assert_eq!(err.status(), 400);

    let err = recommender.recommend("defence", Some(0)).await.unwrap_err();
    assert!(matches!(err, RecommendError::InvalidInput(_)));

    assert_eq!(recommender.embedder().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn news_failure_is_not_degraded_to_company_only() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(1, "ABC", 0.9)]),
        FakeIndex::failing("news_v4"),
    );
    let err = ranker.rank(&[0.5], None).await.unwrap_err();
    assert!(matches!(err, RecommendError::Retrieval(_)));
    assert_eq!(err.status(), 503);
    assert!(err.to_string().contains("news_v4"));
}

#[tokio::test]
async fn company_failure_fails_the_request() {
    let ranker = HybridRanker::new(
        FakeIndex::failing("companies_v2"),
        news_index(vec![news(1, "ABC", 0.9)]),
    );
    let err = ranker.rank(&[0.5], None).await.unwrap_err();
    assert_eq!(err.code(), "SEARCH_FAILED");
    assert!(err.to_string().contains("companies_v2"));
}

#[tokio::test]
async fn malformed_company_payload_is_data_integrity_error() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(1, "ABC", 0.9), point(2, 0.8, json!({"nse": "DEF"}))]),
        news_index(Vec::new()),
    );
    let err = ranker.rank(&[0.5], None).await.unwrap_err();
    assert!(matches!(err, RecommendError::DataIntegrity(_)));
}

#[tokio::test]
async fn duplicate_company_ids_are_rejected() {
    let ranker = HybridRanker::new(
        companies_index(vec![company(1, "ABC", 0.9), company(1, "ABC", 0.8)]),
        news_index(Vec::new()),
    );
    let err = ranker.rank(&[0.5], None).await.unwrap_err();
    assert_eq!(err.code(), "DATA_INTEGRITY");
}

#[tokio::test]
async fn empty_vector_is_invalid_input() {
    let ranker = HybridRanker::new(companies_index(Vec::new()), news_index(Vec::new()));
    let err = ranker.rank(&[], None).await.unwrap_err();
    assert!(matches!(err, RecommendError::InvalidInput(_)));
    assert!(ranker.companies().limits().is_empty());
}

#[tokio::test]
async fn identical_inputs_rank_identically() {
    let build = || {
        HybridRanker::new(
            companies_index(vec![
                company(1, "A", 0.6),
                company(2, "B", 0.6),
                company(3, "C", 0.6),
                company(4, "D", 0.7),
            ]),
            news_index(vec![news(10, "d", 0.35)]),
        )
    };
    let first = build().rank(&[0.5], Some(4)).await.unwrap();
    let second = build().rank(&[0.5], Some(4)).await.unwrap();

    assert_eq!(first, second);
    let ids: Vec<_> = first.iter().map(|r| r.id.clone()).collect();
    // A, B and C tie and keep retrieval order; D drops to 0.56 once its
    // weak news is blended in.
    assert_eq!(
        ids,
        [PointId::Num(1), PointId::Num(2), PointId::Num(3), PointId::Num(4)]
    );
}

#[tokio::test]
async fn recommend_runs_full_pipeline() {
    let recommender = Recommender::new(
        FakeEmbedder::ok(),
        HybridRanker::new(
            companies_index(vec![company(1, "SOL", 0.72), company(2, "WND", 0.70)]),
            news_index(vec![news(10, "wnd", 0.9)]),
        ),
    );
    let results = recommender
        .recommend("  renewable energy  ", Some(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].payload.nse.as_deref(), Some("WND"));
    assert_eq!(recommender.embedder().calls.load(Ordering::SeqCst), 1);
    let (company_limits, news_limits) = limits_of(recommender.ranker());
    assert_eq!(company_limits, [10]);
    assert_eq!(news_limits, [50]);
}
