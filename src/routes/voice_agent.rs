//! Voice-agent WebSocket route configuration

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::voice_agent::voice_agent_handler;
use crate::middleware::subprotocol_auth_middleware;
use crate::state::AppState;
use std::sync::Arc;

/// Create the voice-agent WebSocket router
///
/// # Endpoint
///
/// `GET /api/voice-agent` - WebSocket upgrade, relayed to the voice agent
///
/// # Authentication
///
/// The client must offer `access_token.<jwt>` as a sub-protocol, using a
/// token from `GET /api/session`. Requests without a valid token get 401
/// before the upgrade.
pub fn create_voice_agent_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/voice-agent", get(voice_agent_handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            subprotocol_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
