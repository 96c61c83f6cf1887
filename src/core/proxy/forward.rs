//! The two forwarding loops and the coordinator that tears a session down.
//!
//! Both loops are generic over the stream they read and the sink they write,
//! so the same code drives live sockets and in-memory channels. Reads are
//! normalized to [`Received`] before they reach a loop.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::Message as ClientMessage;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Message as UpstreamMessage, Utf8Bytes};
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use super::SessionId;
use super::client::ClientWriter;
use super::close_code::{
    ABNORMAL, NO_STATUS_RECEIVED, NORMAL, is_expected_closure, safe_close_code,
};
use super::frame::Received;
use super::registry::ConnectionRegistry;

/// Reason sent upstream when the client leaves first
pub const CLIENT_DISCONNECTED_REASON: &str = "Client disconnected";

/// How long the surviving loop may keep running once its peer has finished
pub const TEARDOWN_GRACE: Duration = Duration::from_secs(1);

/// Which leg ended a session first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Client,
    Upstream,
}

/// Loop A: relay upstream frames to the client.
///
/// When upstream closes, errors or ends, the close code is normalized with
/// [`safe_close_code`] and written to the client as a close frame. A failed
/// client write ends the loop without a close frame.
pub async fn forward_upstream_to_client<S, W>(
    session_id: SessionId,
    mut upstream: S,
    client: ClientWriter<W>,
) where
    S: Stream<Item = Received> + Unpin,
    W: Sink<ClientMessage> + Unpin + Send,
    W::Error: Display,
{
    let code = loop {
        match upstream.next().await {
            Some(Received::Data(frame)) => {
                if let Err(e) = client.send_frame(frame).await {
                    tracing::debug!(%session_id, error = %e, "Client write failed");
                    return;
                }
            }
            Some(Received::Control) => {}
            Some(Received::Close(code)) => break code.unwrap_or(NO_STATUS_RECEIVED),
            Some(Received::Failed(e)) => {
                tracing::debug!(%session_id, error = %e, "Upstream read failed");
                break ABNORMAL;
            }
            None => break ABNORMAL,
        }
    };

    log_closure(session_id, "Voice agent", code);

    let forwarded = safe_close_code(code);
    if let Err(e) = client.send_close(forwarded, "").await {
        tracing::debug!(%session_id, error = %e, "Could not forward close to client");
    }
}

/// Loop B: relay client frames upstream.
///
/// Ends on client close, read error, end of stream or a failed upstream
/// write. The client's close code is not forwarded. Returns the upstream sink
/// so the coordinator can close it.
pub async fn forward_client_to_upstream<S, U>(
    session_id: SessionId,
    mut client: S,
    mut upstream: U,
) -> U
where
    S: Stream<Item = Received> + Unpin,
    U: Sink<UpstreamMessage> + Unpin,
    U::Error: Display,
{
    let code = loop {
        match client.next().await {
            Some(Received::Data(frame)) => {
                if let Err(e) = upstream.send(frame.into_upstream_message()).await {
                    tracing::error!(%session_id, error = %e, "Upstream write failed");
                    return upstream;
                }
            }
            Some(Received::Control) => {}
            Some(Received::Close(code)) => break code.unwrap_or(NO_STATUS_RECEIVED),
            Some(Received::Failed(e)) => {
                tracing::debug!(%session_id, error = %e, "Client read failed");
                break ABNORMAL;
            }
            None => break ABNORMAL,
        }
    };

    log_closure(session_id, "Client", code);
    upstream
}

/// Run both loops for one session and tear it down when either finishes.
///
/// - client finished first: upstream gets close 1000 `Client disconnected`
///   and its writer is closed
/// - upstream finished first: the client connection is closed (Loop A has
///   already sent its close frame)
///
/// Either way the session is removed from `registry`. The loop that is still
/// running gets [`TEARDOWN_GRACE`] to exit on its own and is aborted after
/// that, which drops its half of the connection.
pub async fn run_session<CS, CW, US, UW>(
    session_id: SessionId,
    client_stream: CS,
    client: ClientWriter<CW>,
    upstream_stream: US,
    upstream_sink: UW,
    registry: &ConnectionRegistry,
) -> SessionEnd
where
    CS: Stream<Item = Received> + Unpin + Send + 'static,
    CW: Sink<ClientMessage> + Unpin + Send + 'static,
    CW::Error: Display,
    US: Stream<Item = Received> + Unpin + Send + 'static,
    UW: Sink<UpstreamMessage> + Unpin + Send + 'static,
    UW::Error: Display,
{
    let (upstream_done_tx, upstream_done_rx) = oneshot::channel::<()>();
    let (client_done_tx, client_done_rx) = oneshot::channel::<UW>();

    let writer = client.clone();
    let loop_a = tokio::spawn(async move {
        forward_upstream_to_client(session_id, upstream_stream, writer).await;
        let _ = upstream_done_tx.send(());
    });

    let loop_b = tokio::spawn(async move {
        let sink = forward_client_to_upstream(session_id, client_stream, upstream_sink).await;
        let _ = client_done_tx.send(sink);
    });

    let end = tokio::select! {
        finished = client_done_rx => {
            if let Ok(upstream) = finished {
                if tokio::time::timeout(TEARDOWN_GRACE, close_upstream(session_id, upstream))
                    .await
                    .is_err()
                {
                    tracing::debug!(%session_id, "Voice agent close timed out");
                }
            }
            SessionEnd::Client
        }
        _ = upstream_done_rx => {
            if tokio::time::timeout(TEARDOWN_GRACE, client.close()).await.is_err() {
                tracing::debug!(%session_id, "Client close timed out");
            }
            SessionEnd::Upstream
        }
    };

    registry.remove(session_id);

    match end {
        SessionEnd::Client => reap(session_id, loop_a, "Voice agent").await,
        SessionEnd::Upstream => reap(session_id, loop_b, "Client").await,
    }

    tracing::info!(%session_id, ended_by = ?end, "Proxy session finished");
    end
}

async fn close_upstream<U>(session_id: SessionId, mut upstream: U)
where
    U: Sink<UpstreamMessage> + Unpin,
    U::Error: Display,
{
    let close = UpstreamMessage::Close(Some(UpstreamCloseFrame {
        code: CloseCode::from(NORMAL),
        reason: Utf8Bytes::from_static(CLIENT_DISCONNECTED_REASON),
    }));
    if let Err(e) = upstream.send(close).await {
        tracing::debug!(%session_id, error = %e, "Could not send close to voice agent");
    }
    if let Err(e) = upstream.close().await {
        tracing::debug!(%session_id, error = %e, "Error closing voice agent connection");
    }
}

/// Wait for the remaining loop, aborting it once the grace period runs out.
async fn reap(session_id: SessionId, task: JoinHandle<()>, side: &str) {
    let abort = task.abort_handle();
    if tokio::time::timeout(TEARDOWN_GRACE, task).await.is_err() {
        abort.abort();
        tracing::debug!(%session_id, "{side} loop still running after close, aborted");
    }
}

fn log_closure(session_id: SessionId, side: &str, code: u16) {
    if is_expected_closure(code) {
        tracing::info!(%session_id, code, "{side} connection closed normally");
    } else {
        tracing::error!(%session_id, code, "{side} connection closed unexpectedly");
    }
}
