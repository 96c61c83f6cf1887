use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, metadata, session};
use crate::state::AppState;
use std::sync::Arc;

/// Create the public HTTP router
///
/// # Endpoints
///
/// - `GET /api/session` - issue a session token
/// - `GET /api/metadata` - project metadata
/// - `GET /health` - liveness check
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(session::create_session))
        .route("/api/metadata", get(metadata::get_metadata))
        .route("/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}
