//! HTTP surface: one handler per evaluation kind plus leaderboard and draft valuation

use crate::error::AppError;
use crate::APP_VERSION;
use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
    routing::{get, post},
    Router,
};
use engine::{
    DraftPickAsset, EvaluationOrchestrator, EvaluationRequest, GradeRequest, LeaderboardParams,
    LeaderboardQuery, SimulateOutcomesRequest, SimulateSeasonRequest, WhatIfRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<EvaluationOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct DraftValuationRequest {
    pub picks: Vec<DraftPickAsset>,
}

type ApiResult = Result<Json<Value>, AppError>;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/evaluate", post(api_evaluate))
        .route("/trades/grade", post(api_grade))
        .route("/trades/simulate-outcomes", post(api_simulate_outcomes))
        .route("/trades/simulate-season", post(api_simulate_season))
        .route("/trades/what-if", post(api_what_if))
        .route("/leaderboard", get(api_leaderboard))
        .route("/draft/valuation", post(api_draft_valuation))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// The caller's own JWT, forwarded as the first credential strategy
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn success<T: Serialize>(data: T) -> ApiResult {
    Ok(Json(json!({
        "success": true,
        "data": data,
    })))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "trade-eval",
        "version": APP_VERSION,
    }))
}

/// POST /api/evaluate — tagged request, dispatched on `kind`
async fn api_evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<EvaluationRequest>,
) -> ApiResult {
    let response = state
        .orchestrator
        .evaluate(&request, bearer_token(&headers))
        .await?;
    success(response)
}

/// POST /api/trades/grade
async fn api_grade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GradeRequest>,
) -> ApiResult {
    info!(trade_id = %request.trade_id, "Grade requested");
    let eval = state
        .orchestrator
        .grade(&request, bearer_token(&headers))
        .await?;
    success(eval)
}

/// POST /api/trades/simulate-outcomes
async fn api_simulate_outcomes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SimulateOutcomesRequest>,
) -> ApiResult {
    let eval = state
        .orchestrator
        .simulate_outcomes(&request, bearer_token(&headers))
        .await?;
    success(eval)
}

/// POST /api/trades/simulate-season
async fn api_simulate_season(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SimulateSeasonRequest>,
) -> ApiResult {
    let eval = state
        .orchestrator
        .simulate_season(&request, bearer_token(&headers))
        .await?;
    success(eval)
}

/// POST /api/trades/what-if
async fn api_what_if(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<WhatIfRequest>,
) -> ApiResult {
    let eval = state
        .orchestrator
        .what_if(&request, bearer_token(&headers))
        .await?;
    success(eval)
}

/// GET /api/leaderboard — paginated GM scores
async fn api_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult {
    let query = LeaderboardQuery::try_from(params)?;
    let page = state.orchestrator.leaderboard(&query).await?;
    success(page)
}

/// POST /api/draft/valuation — side-by-side chart values for a set of picks
async fn api_draft_valuation(
    State(state): State<AppState>,
    Json(request): Json<DraftValuationRequest>,
) -> ApiResult {
    let capital = state.orchestrator.draft_valuation(&request.picks)?;
    success(capital)
}

// ============================================================================
// Tests
// ============================================================================
