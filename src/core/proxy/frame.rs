//! Conversions between the client-side (axum) and upstream-side (tungstenite)
//! WebSocket message types.

use axum::extract::ws::Message as ClientMessage;
use bytes::Bytes;
use tokio_tungstenite::tungstenite::{self, Message as UpstreamMessage};

/// A data frame relayed unmodified between the two legs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

impl Frame {
    pub fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_client_message(self) -> ClientMessage {
        match self {
            Frame::Text(text) => ClientMessage::Text(text.into()),
            Frame::Binary(data) => ClientMessage::Binary(data),
        }
    }

    pub fn into_upstream_message(self) -> UpstreamMessage {
        match self {
            Frame::Text(text) => UpstreamMessage::Text(text.into()),
            Frame::Binary(data) => UpstreamMessage::Binary(data),
        }
    }
}

/// One item read from either leg, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// Text or binary payload to forward
    Data(Frame),
    /// Close frame, with its status code if it carried one
    Close(Option<u16>),
    /// Ping, pong or raw frame; answered by the WebSocket library
    Control,
    /// The read failed
    Failed(String),
}

impl From<ClientMessage> for Received {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Text(text) => Received::Data(Frame::Text(text.as_str().to_owned())),
            ClientMessage::Binary(data) => Received::Data(Frame::Binary(data)),
            ClientMessage::Close(frame) => Received::Close(frame.map(|f| f.code)),
            ClientMessage::Ping(_) | ClientMessage::Pong(_) => Received::Control,
        }
    }
}

impl From<Result<ClientMessage, axum::Error>> for Received {
    fn from(result: Result<ClientMessage, axum::Error>) -> Self {
        match result {
            Ok(message) => message.into(),
            Err(e) => Received::Failed(e.to_string()),
        }
    }
}

impl From<UpstreamMessage> for Received {
    fn from(message: UpstreamMessage) -> Self {
        match message {
            UpstreamMessage::Text(text) => Received::Data(Frame::Text(text.as_str().to_owned())),
            UpstreamMessage::Binary(data) => Received::Data(Frame::Binary(data)),
            UpstreamMessage::Close(frame) => Received::Close(frame.map(|f| u16::from(f.code))),
            UpstreamMessage::Ping(_) | UpstreamMessage::Pong(_) | UpstreamMessage::Frame(_) => {
                Received::Control
            }
        }
    }
}

impl From<Result<UpstreamMessage, tungstenite::Error>> for Received {
    fn from(result: Result<UpstreamMessage, tungstenite::Error>) -> Self {
        match result {
            Ok(message) => message.into(),
            Err(e) => Received::Failed(e.to_string()),
        }
    }
}
