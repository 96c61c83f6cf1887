//! Voice-agent WebSocket handler
//!
//! Upgrades an authenticated browser connection, dials the voice agent and
//! relays frames between the two until either side goes away.

use axum::{
    Extension,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::AcceptedProtocol;
use crate::core::proxy::{ClientWriter, ErrorEnvelope, Received, SessionId, run_session};
use crate::state::AppState;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Voice-agent WebSocket handler
///
/// Runs behind [`subprotocol_auth_middleware`](crate::middleware::subprotocol_auth_middleware),
/// which has already validated the session token. The accepted
/// `access_token.<jwt>` sub-protocol is echoed back in the handshake response.
///
/// # Arguments
/// * `ws` - The WebSocket upgrade request from Axum
/// * `peer` - Remote address of the client
/// * `state` - Application state
/// * `accepted` - Sub-protocol accepted by the auth middleware
///
/// # Returns
/// * `Response` - HTTP response that upgrades the connection to WebSocket
pub async fn voice_agent_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    Extension(accepted): Extension<AcceptedProtocol>,
) -> Response {
    info!(%peer, "Voice agent WebSocket connection upgrade requested");

    ws.protocols([accepted.0])
        .max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_voice_agent_socket(socket, peer, state))
}

/// Drive one proxy session from upgrade to teardown
async fn handle_voice_agent_socket(socket: WebSocket, peer: SocketAddr, state: Arc<AppState>) {
    let session_id = SessionId::new();
    info!(%session_id, %peer, "Client connected");

    let (client_sink, client_stream) = socket.split();
    let client = ClientWriter::new(client_sink);
    state
        .registry
        .register(session_id, Arc::new(client.clone()));

    let upstream = match state.dialer.dial().await {
        Ok(upstream) => upstream,
        Err(e) => {
            error!(%session_id, error = %e, "Failed to connect to voice agent");
            match ErrorEnvelope::connection_failed().to_json() {
                Ok(json) => {
                    if let Err(e) = client.send(Message::Text(json.into())).await {
                        error!(%session_id, error = %e, "Failed to send error to client");
                    }
                }
                Err(e) => error!(%session_id, error = %e, "Failed to serialize error envelope"),
            }
            client.close().await;
            state.registry.remove(session_id);
            return;
        }
    };

    let (upstream_sink, upstream_stream) = upstream.split();

    run_session(
        session_id,
        client_stream.map(Received::from),
        client,
        upstream_stream.map(Received::from),
        upstream_sink,
        &state.registry,
    )
    .await;
}
