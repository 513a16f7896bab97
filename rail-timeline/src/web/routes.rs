//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::timeline::{DEFAULT_LIMIT, ScheduleQuery, ScheduleRow, query};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reschedule", post(reschedule))
        .route("/api/schedule/train", get(schedule_by_train))
        .route("/api/schedule/station", get(schedule_by_station))
        .route("/api/schedule/junction", get(schedule_by_junction))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Decide whether a train should go first, wait or be rerouted.
async fn reschedule(
    State(state): State<AppState>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<RescheduleResponse>, AppError> {
    let op_state = req.snapshot().state();

    let decision = {
        let mut rng = state.rng.lock().map_err(|_| AppError::Internal {
            message: "random source poisoned".to_string(),
        })?;
        state.policy.decide(&op_state, &mut *rng)
    };

    info!(
        train = %req.train_id,
        state = %op_state,
        action = %decision.action,
        source = ?decision.source,
        "reschedule decision"
    );

    Ok(Json(RescheduleResponse {
        decision: decision.action,
        message: decision.action.message(&req.train_id),
        confidence: decision.source,
    }))
}

fn run_query(state: &AppState, q: ScheduleQuery) -> Result<Json<Vec<ScheduleRow>>, AppError> {
    if q.is_blank() {
        return Err(AppError::BadRequest {
            message: "query must not be empty".to_string(),
        });
    }

    let rows = query::query(&state.timeline, &q, DEFAULT_LIMIT)
        .into_iter()
        .map(ScheduleRow::from)
        .collect();
    Ok(Json(rows))
}

async fn schedule_by_train(
    State(state): State<AppState>,
    Query(req): Query<TrainScheduleQuery>,
) -> Result<Json<Vec<ScheduleRow>>, AppError> {
    run_query(&state, ScheduleQuery::Train(req.train_number))
}

async fn schedule_by_station(
    State(state): State<AppState>,
    Query(req): Query<StationScheduleQuery>,
) -> Result<Json<Vec<ScheduleRow>>, AppError> {
    run_query(&state, ScheduleQuery::Station(req.station_code))
}

async fn schedule_by_junction(
    State(state): State<AppState>,
    Query(req): Query<JunctionScheduleQuery>,
) -> Result<Json<Vec<ScheduleRow>>, AppError> {
    run_query(&state, ScheduleQuery::Junction(req.junction))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => {
                error!(%message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
