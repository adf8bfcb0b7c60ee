//! JSON API over the recommender.
//!
//! `POST /api/recommend` takes `{"query": "...", "limit": n}` and answers
//! with `{"results": [...], "query": "..."}`. Failures answer with
//! `{"error": "...", "code": "..."}` and the status from
//! [`RecommendError::status`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::RecommendError;
use crate::search::{Embedder, RankedResult, Recommender, VectorIndex};

struct AppState<E, C, N> {
    recommender: Recommender<E, C, N>,
    settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<RankedResult>,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the API router.
pub fn router<E, C, N>(recommender: Recommender<E, C, N>, settings: Settings) -> Router
where
    E: Embedder + 'static,
    C: VectorIndex + 'static,
    N: VectorIndex + 'static,
{
    let state = Arc::new(AppState {
        recommender,
        settings,
    });
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/recommend", post(recommend_handler::<E, C, N>))
        .with_state(state)
}

/// Binds `addr` and serves the API until the process exits.
pub async fn serve<E, C, N>(
    recommender: Recommender<E, C, N>,
    settings: Settings,
    addr: SocketAddr,
) -> anyhow::Result<()>
where
    E: Embedder + 'static,
    C: VectorIndex + 'static,
    N: VectorIndex + 'static,
{
    let app = router(recommender, settings);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "recommend API listening");
    axum::serve(listener, app).await.context("server shutdown")?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn recommend_handler<E, C, N>(
    State(state): State<Arc<AppState<E, C, N>>>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, RecommendError>
where
    E: Embedder,
    C: VectorIndex,
    N: VectorIndex,
{
    let Json(request) = payload.map_err(|rejection| {
        RecommendError::InvalidInput(format!("malformed request body: {}", rejection.body_text()))
    })?;
    let query = request
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| RecommendError::InvalidInput("query is required and cannot be empty".into()))?;
    let limit = state.settings.resolve_limit(request.limit);

    let results = state
        .recommender
        .recommend(&query, Some(limit))
        .await
        .inspect_err(|err| tracing::error!(code = err.code(), error = %err, "recommend failed"))?;

    Ok(Json(RecommendResponse { results, query }))
}
