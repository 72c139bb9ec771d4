//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{error::TimerError, state::AppState};
use super::responses::{ApiResponse, HealthResponse, StartRequest, StatusResponse};

type Rejection = (StatusCode, Json<ApiResponse>);

fn reject(state: &AppState, error: TimerError) -> Rejection {
    let status = match error {
        TimerError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        TimerError::InvalidState { .. } => StatusCode::CONFLICT,
    };
    warn!("Rejected timer command: {}", error);
    (status, Json(ApiResponse::error(error.to_string(), state.get_timer_state())))
}

/// Handle POST /start - Begin a countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse>, Rejection> {
    match state.start_countdown(request.hours, request.minutes, request.seconds) {
        Ok(snapshot) => {
            info!("Start endpoint called - countdown of {} started", snapshot.display);
            Ok(Json(ApiResponse::from_snapshot(
                format!("Countdown started at {}", snapshot.display),
                snapshot,
            )))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

/// Handle POST /pause - Toggle between paused and running
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.toggle_pause();
    info!("Pause endpoint called - timer is {}", snapshot.phase);
    Json(ApiResponse::from_snapshot(
        format!("Timer {} at {}", snapshot.phase, snapshot.display),
        snapshot,
    ))
}

/// Handle POST /resume - Continue a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.resume_countdown();
    info!("Resume endpoint called - timer is {}", snapshot.phase);
    Json(ApiResponse::from_snapshot(
        format!("Timer {} at {}", snapshot.phase, snapshot.display),
        snapshot,
    ))
}

/// Handle POST /stop - Stop the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.stop_countdown();
    info!("Stop endpoint called - countdown stopped");
    Json(ApiResponse::from_snapshot("Countdown stopped".to_string(), snapshot))
}

/// Handle POST /alert/dismiss - Lower the completion alert
pub async fn dismiss_alert_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let message = if state.dismiss_alert() {
        "Alert dismissed"
    } else {
        "No alert showing"
    };
    Json(ApiResponse::from_snapshot(message.to_string(), state.get_timer_state()))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_timer_state(),
        alert_active: state.alert_active(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
