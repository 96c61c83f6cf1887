//! Sub-protocol based authentication for the voice-agent WebSocket.
//!
//! Browsers cannot attach an `Authorization` header to a WebSocket handshake,
//! so the session token travels as an offered sub-protocol of the form
//! `access_token.<jwt>`. The accepted candidate is echoed back on upgrade.

use axum::http::HeaderMap;
use axum::http::header::SEC_WEBSOCKET_PROTOCOL;

use super::token::SessionTokenService;

/// Prefix marking a sub-protocol candidate that carries a session token
pub const ACCESS_TOKEN_PREFIX: &str = "access_token.";

/// Sub-protocol accepted during authentication, echoed back on upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedProtocol(pub String);

impl AcceptedProtocol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Collect every offered sub-protocol in offer order.
///
/// Handles both repeated `Sec-WebSocket-Protocol` headers and comma-separated
/// values within one header. Entries are trimmed, empty ones skipped, and
/// values that are not valid header strings ignored.
pub fn requested_protocols(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SEC_WEBSOCKET_PROTOCOL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Return the first `access_token.` candidate whose token validates.
///
/// Candidates without the prefix, and candidates whose token fails
/// validation, are skipped; a later valid candidate still wins.
pub fn select_access_protocol(
    protocols: &[String],
    tokens: &SessionTokenService,
) -> Option<AcceptedProtocol> {
    protocols.iter().find_map(|candidate| {
        let token = candidate.strip_prefix(ACCESS_TOKEN_PREFIX)?;
        match tokens.validate_token(token) {
            Ok(_) => Some(AcceptedProtocol(candidate.clone())),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access_token sub-protocol candidate");
                None
            }
        }
    })
}
