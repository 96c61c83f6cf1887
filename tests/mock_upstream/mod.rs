//! Mock voice-agent server
//!
//! Accepts WebSocket connections the way the real agent endpoint does and
//! reports what it saw through a channel so tests can assert on the upstream
//! leg of a proxy session.

#![allow(dead_code)]

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};

/// How the mock treats each accepted connection
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Echo every text and binary frame back unchanged
    Echo,
    /// Send a close frame with this code right after the handshake
    CloseWith(u16),
    /// Drop the TCP connection right after the handshake, no close frame
    Drop,
    /// Refuse the handshake with this HTTP status
    Reject(u16),
}

/// Something the mock observed
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEvent {
    Connected { authorization: Option<String> },
    Received(Message),
    Closed(Option<(u16, String)>),
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub events: mpsc::UnboundedReceiver<UpstreamEvent>,
}

impl MockUpstream {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().unwrap();
        let (events_tx, events) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let events_tx = events_tx.clone();
                tokio::spawn(handle_connection(stream, behavior, events_tx));
            }
        });

        Self { addr, events }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/v1/agent/converse", self.addr)
    }

    /// Wait for the next event, failing the test after two seconds.
    pub async fn next_event(&mut self) -> UpstreamEvent {
        tokio::time::timeout(std::time::Duration::from_secs(2), self.events.recv())
            .await
            .expect("timed out waiting for upstream event")
            .expect("mock upstream stopped")
    }
}

async fn handle_connection(
    stream: TcpStream,
    behavior: Behavior,
    events: mpsc::UnboundedSender<UpstreamEvent>,
) {
    let mut authorization = None;
    let handshake = accept_hdr_async(stream, |request: &Request, response: Response| {
        authorization = request
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if let Behavior::Reject(status) = behavior {
            let mut error = ErrorResponse::new(Some("rejected by mock".to_string()));
            *error.status_mut() = StatusCode::from_u16(status).unwrap();
            return Err(error);
        }
        Ok(response)
    })
    .await;

    let Ok(ws) = handshake else {
        return;
    };
    let _ = events.send(UpstreamEvent::Connected { authorization });

    let (mut write, mut read) = ws.split();

    match behavior {
        Behavior::CloseWith(code) => {
            let _ = write
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::from(code),
                    reason: Utf8Bytes::from_static(""),
                })))
                .await;
            // Drain until the peer answers the close
            while let Some(Ok(_)) = read.next().await {}
        }
        Behavior::Drop => {
            drop(write);
            drop(read);
        }
        Behavior::Echo => {
            while let Some(Ok(message)) = read.next().await {
                match message {
                    Message::Text(_) | Message::Binary(_) => {
                        let _ = events.send(UpstreamEvent::Received(message.clone()));
                        if write.send(message).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(frame) => {
                        let _ = events.send(UpstreamEvent::Closed(
                            frame.map(|f| (u16::from(f.code), f.reason.as_str().to_owned())),
                        ));
                        break;
                    }
                    _ => {}
                }
            }
        }
        Behavior::Reject(_) => {}
    }
}
