use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, audio, scripts};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
///
/// Uploads larger than `max_upload_bytes` are rejected with 413.
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-audio", get(audio::generate_audio))
        .route(
            "/upload-tigris",
            post(scripts::upload_script).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(TraceLayer::new_for_http())
}

/// Public routes that carry no state of their own
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(api::health_check))
}

/// Public and API routes bound to `state`
pub fn create_app(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    create_public_router()
        .merge(create_api_router(max_upload_bytes))
        .with_state(state)
}
