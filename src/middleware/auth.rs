use crate::auth::{ACCESS_TOKEN_PREFIX, requested_protocols, select_access_protocol};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authentication middleware for the voice-agent WebSocket
///
/// Browsers cannot set an `Authorization` header on a WebSocket handshake, so
/// the session token is offered as a `Sec-WebSocket-Protocol` candidate of the
/// form `access_token.<jwt>`.
///
/// The middleware:
/// 1. Collects every offered sub-protocol
/// 2. Picks the first `access_token.` candidate whose token validates
/// 3. Inserts it as an [`AcceptedProtocol`](crate::auth::AcceptedProtocol) so
///    the handler can echo it on upgrade
/// 4. Returns 401 `Unauthorized` otherwise, before any upgrade happens
///
/// # Arguments
/// * `state` - Application state holding the session token service
/// * `request` - The incoming HTTP request
/// * `next` - The next middleware or handler in the chain
///
/// # Returns
/// * `Result<Response, AuthError>` - The response from the next handler or an auth error
pub async fn subprotocol_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let offered = requested_protocols(request.headers());

    if !offered
        .iter()
        .any(|candidate| candidate.starts_with(ACCESS_TOKEN_PREFIX))
    {
        tracing::warn!(
            path = %request.uri().path(),
            "WebSocket upgrade rejected: no access_token sub-protocol"
        );
        return Err(AuthError::MissingToken);
    }

    let Some(accepted) = select_access_protocol(&offered, &state.tokens) else {
        tracing::warn!(
            path = %request.uri().path(),
            offered = offered.len(),
            "WebSocket upgrade rejected: no valid session token"
        );
        return Err(AuthError::InvalidToken(
            "no access_token sub-protocol carried a valid token".to_string(),
        ));
    };

    tracing::debug!("Session token accepted");
    request.extensions_mut().insert(accepted);
    Ok(next.run(request).await)
}
