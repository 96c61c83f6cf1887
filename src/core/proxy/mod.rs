//! Bidirectional relay between a browser WebSocket and the voice-agent service.
//!
//! A proxy session pairs one accepted client connection with one upstream
//! connection. Two forwarding loops copy frames in each direction and a
//! coordinator tears both legs down once either side finishes.

pub mod client;
pub mod close_code;
pub mod forward;
pub mod frame;
pub mod registry;
pub mod upstream;

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

pub use client::{ClientCloser, ClientWriter};
pub use close_code::safe_close_code;
pub use forward::{forward_client_to_upstream, forward_upstream_to_client, run_session};
pub use frame::{Frame, Received};
pub use registry::{ConnectionRegistry, SessionHandle};
pub use upstream::{ErrorEnvelope, UpstreamDialer, UpstreamStream};

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while dialing upstream or writing to either leg
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream handshake could not be built
    #[error("Invalid upstream request: {0}")]
    InvalidRequest(String),

    /// The upstream refused or the connection failed
    #[error("Failed to connect to upstream: {0}")]
    Dial(String),

    /// The upstream did not complete the handshake in time
    #[error("Upstream connection timed out after {0:?}")]
    DialTimeout(Duration),

    /// The client connection has already been closed locally
    #[error("Client connection closed")]
    ClientClosed,

    /// A read or write on an established connection failed
    #[error("WebSocket error: {0}")]
    Transport(String),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

// =============================================================================
// Session Identity
// =============================================================================

/// Identity of one proxy session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
