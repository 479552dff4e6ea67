//! HTTP command surface consumed by the popup/UI layer.

use crate::models::{DashboardSnapshot, LastError, Preferences, PrefsPatch, RefreshOutcome};
use crate::modules::scheduler::AlarmSync;
use crate::modules::storage::Store;
use crate::watcher::orchestrator::RefreshOrchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_PATH_REFRESH: &str = "/api/refresh";
const API_PATH_ALARM_SYNC: &str = "/api/alarm/sync";
const API_PATH_STATUS: &str = "/api/status";
const API_PATH_PREFS: &str = "/api/prefs";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RefreshOrchestrator>,
    pub store: Arc<Store>,
    pub alarm: Arc<AlarmSync>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub snapshot: Option<DashboardSnapshot>,
    pub last_error: Option<LastError>,
    /// Milliseconds until the next refresh attempt is admitted. Callers
    /// are expected to self-throttle on this instead of hammering refresh.
    pub next_allowed_in_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(API_PATH_REFRESH, post(refresh_handler))
        .route(API_PATH_ALARM_SYNC, post(sync_alarm_handler))
        .route(API_PATH_STATUS, get(status_handler))
        .route(API_PATH_PREFS, get(get_prefs_handler).post(set_prefs_handler))
        .with_state(state)
}

async fn refresh_handler(
    State(state): State<AppState>,
    payload: Option<Json<RefreshRequest>>,
) -> Json<RefreshOutcome> {
    let reason = payload
        .and_then(|Json(req)| req.reason)
        .unwrap_or_else(|| "manual".to_string());
    Json(state.orchestrator.refresh(&reason).await)
}

async fn sync_alarm_handler(State(state): State<AppState>) -> Json<AckResponse> {
    state.alarm.sync();
    Json(AckResponse { ok: true })
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        snapshot: state.store.snapshot(),
        last_error: state.store.last_error(),
        next_allowed_in_ms: state.orchestrator.next_allowed_in_ms(),
    })
}

async fn get_prefs_handler(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.store.prefs())
}

async fn set_prefs_handler(
    State(state): State<AppState>,
    Json(patch): Json<PrefsPatch>,
) -> Result<Json<Preferences>, (StatusCode, Json<ErrorResponse>)> {
    let affects_schedule = patch.affects_schedule();
    let prefs = state.store.set_prefs(&patch).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    if affects_schedule {
        state.alarm.sync();
    }
    Ok(Json(prefs))
}
