use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::errors::app_error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
}

/// Issue a session token for the voice-agent WebSocket
///
/// The browser offers the token back as the `access_token.<jwt>` sub-protocol.
pub async fn create_session(State(state): State<Arc<AppState>>) -> AppResult<Json<SessionResponse>> {
    let token = state.tokens.issue_token()?;
    tracing::debug!("Issued session token");
    Ok(Json(SessionResponse { token }))
}
