pub mod proxy;

// Re-export commonly used types for convenience
pub use proxy::{
    ClientCloser, ClientWriter, ConnectionRegistry, ErrorEnvelope, Frame, ProxyError, ProxyResult,
    Received, SessionId, UpstreamDialer, UpstreamStream, run_session, safe_close_code,
};
