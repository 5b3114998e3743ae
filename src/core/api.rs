//! HTTP API for Synergy
//!
//! Endpoints:
//! - POST /nextword - Select the next connector word
//! - GET /healthz - Readiness and model info (alias: /health)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::SelectionOrchestrator;
use crate::types::{ScoredWord, SelectionRequest, Word};

/// App state
pub struct AppState {
    pub engine: Arc<SelectionOrchestrator>,
}

/// Next word request (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct NextWordRequest {
    pub prev_human: Option<String>,
    pub prev_bot: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub top_k: Option<usize>,
    pub beta: Option<f32>,
    pub gamma: Option<f32>,
}

/// Next word response
#[derive(Debug, Serialize)]
pub struct NextWordResponse {
    pub choice: Option<Word>,
    pub scores: Vec<ScoredWord>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ready: bool,
    pub words: usize,
    pub strategy: String,
    pub model: String,
    pub embedder: String,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Validation error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the API router
pub fn create_router(engine: Arc<SelectionOrchestrator>) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/healthz", get(health))
        .route("/health", get(health))
        .route("/nextword", post(next_word))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine = &state.engine;
    let bank = engine.bank();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        ready: bank.is_ready(),
        words: bank.len(),
        strategy: engine.strategy().to_string(),
        model: engine.model_name().to_string(),
        embedder: bank.model_name().to_string(),
        loaded_at: bank.loaded_at(),
    })
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: String) -> ApiError {
    warn!(status = status.as_u16(), error = %error, "rejected next word request");
    (status, Json(ErrorResponse { error }))
}

/// Select the next word
///
/// Malformed bodies and out-of-range values both answer `{"error": ...}`.
async fn next_word(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NextWordRequest>, JsonRejection>,
) -> Result<Json<NextWordResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| reject(e.status(), e.body_text()))?;

    let request = SelectionRequest::new(
        req.prev_human,
        req.prev_bot,
        &req.exclude.unwrap_or_default(),
        req.top_k,
        req.beta,
        req.gamma,
    )
    .map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let result = state.engine.select(&request).await;

    Ok(Json(NextWordResponse {
        choice: result.choice,
        scores: result.scores,
    }))
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    engine: Arc<SelectionOrchestrator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Synergy API running on {}", addr);
    info!("  POST /nextword - Select next word");
    info!("  GET  /healthz  - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
