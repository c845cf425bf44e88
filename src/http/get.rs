use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::*;

use crate::appstate::{AppState, Report};
use crate::device::ChannelSummary;
use crate::http::messages::HeartbeatMessage;

/// Returns the latest report polled from the device
#[axum::debug_handler]
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Report>, StatusCode> {
    if let Ok(guard) = state.report.lock() {
        if let Some(ref report) = *guard {
            return Ok(Json(report.clone()));
        }

        // No poll succeeded yet
        warn!("GET data attempted but no report in app state");
        return Err(StatusCode::NO_CONTENT);
    }

    error!("Unable to lock the report mutex during GET data");
    Err(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Returns the channel configuration read from the device at startup
#[axum::debug_handler]
pub async fn get_channels(State(state): State<AppState>) -> Json<Vec<ChannelSummary>> {
    Json(state.channels.as_ref().clone())
}

#[axum::debug_handler]
pub async fn get_heartbeat(State(state): State<AppState>) -> Json<HeartbeatMessage> {
    let last_poll = state
        .report
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|report| report.time));
    Json(HeartbeatMessage::new(last_poll))
}
