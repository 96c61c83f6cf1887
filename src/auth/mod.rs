//! Session tokens and WebSocket sub-protocol authentication

pub mod subprotocol;
pub mod token;

pub use subprotocol::{
    ACCESS_TOKEN_PREFIX, AcceptedProtocol, requested_protocols, select_access_protocol,
};
pub use token::{SessionClaims, SessionSecret, SessionTokenService};
