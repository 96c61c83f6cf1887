//! Write side of an accepted client connection.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message};
use futures_util::{Sink, SinkExt};
use tokio::sync::Mutex;

use super::frame::Frame;
use super::{ProxyError, ProxyResult};

/// Anything the shutdown broadcast can close
#[async_trait]
pub trait ClientCloser: Send + Sync {
    /// Send a close frame with `code` and `reason`, then close the connection.
    async fn close_with(&self, code: u16, reason: &str);
}

/// Shared, serialized writer for one client connection.
///
/// Loop A, the coordinator and the shutdown broadcast all write through the
/// same writer. Writes are serialized behind an async mutex and, once
/// [`close`](Self::close) has run, the sink is dropped and further writes
/// fail with [`ProxyError::ClientClosed`].
pub struct ClientWriter<W> {
    sink: Arc<Mutex<Option<W>>>,
}

impl<W> Clone for ClientWriter<W> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<W> ClientWriter<W>
where
    W: Sink<Message> + Unpin + Send,
    W::Error: Display,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Some(sink))),
        }
    }

    pub async fn send(&self, message: Message) -> ProxyResult<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(ProxyError::ClientClosed)?;
        sink.send(message)
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))
    }

    pub async fn send_frame(&self, frame: Frame) -> ProxyResult<()> {
        self.send(frame.into_client_message()).await
    }

    /// Write a close frame without releasing the sink.
    pub async fn send_close(&self, code: u16, reason: &str) -> ProxyResult<()> {
        self.send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.to_owned().into(),
        })))
        .await
    }

    /// Close the connection. Only the first call reaches the sink.
    pub async fn close(&self) {
        let Some(mut sink) = self.sink.lock().await.take() else {
            return;
        };
        if let Err(e) = sink.close().await {
            tracing::debug!(error = %e, "Error closing client connection");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.sink.lock().await.is_none()
    }
}

#[async_trait]
impl<W> ClientCloser for ClientWriter<W>
where
    W: Sink<Message> + Unpin + Send + 'static,
    W::Error: Display,
{
    async fn close_with(&self, code: u16, reason: &str) {
        if let Err(e) = self.send_close(code, reason).await {
            tracing::debug!(error = %e, code, "Could not send close frame to client");
        }
        self.close().await;
    }
}
