use axum::Router;
use axum::routing::get;

use crate::appstate::AppState;

pub mod get;
pub mod messages;

pub use get::*;

/// Routes exposing the device readings over http
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/data", get(get_data))
        .route("/channels", get(get_channels))
        .route("/heartbeat", get(get_heartbeat))
        .with_state(state)
}
