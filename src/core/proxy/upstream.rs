//! Dialing the voice-agent service.

use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use zeroize::Zeroizing;

use super::{ProxyError, ProxyResult};

/// Production voice-agent endpoint
pub const DEFAULT_AGENT_URL: &str = "wss://agent.deepgram.com/v1/agent/converse";

/// Default bound on the upstream handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub type UpstreamStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens authenticated WebSocket connections to the voice-agent service
pub struct UpstreamDialer {
    url: String,
    api_key: Zeroizing<String>,
    connect_timeout: Duration,
}

impl UpstreamDialer {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: Zeroizing::new(api_key.into()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect to the agent URL with `Authorization: Token <key>`.
    ///
    /// No retries; the caller reports failure to the client and gives up.
    pub async fn dial(&self) -> ProxyResult<UpstreamStream> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

        let mut authorization = HeaderValue::from_str(&format!("Token {}", self.api_key.as_str()))
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;
        authorization.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, authorization);

        tracing::debug!(url = %self.url, "Connecting to voice agent");

        let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| ProxyError::DialTimeout(self.connect_timeout))?
            .map_err(|e| ProxyError::Dial(e.to_string()))?;

        tracing::info!(
            url = %self.url,
            status = %response.status(),
            "Connected to voice agent"
        );
        Ok(stream)
    }
}

/// Structured error frame sent to the client when the session cannot start
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: String,
    pub code: &'static str,
}

impl ErrorEnvelope {
    pub fn connection_failed() -> Self {
        Self {
            kind: "Error",
            description: "Failed to establish proxy connection".to_string(),
            code: "CONNECTION_FAILED",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_error_envelope_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&ErrorEnvelope::connection_failed().to_json().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "Error",
                "description": "Failed to establish proxy connection",
                "code": "CONNECTION_FAILED",
            })
        );
    }

    #[tokio::test]
    async fn test_dial_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dialer = UpstreamDialer::new(format!("ws://{addr}"), "key");
        assert!(matches!(dialer.dial().await, Err(ProxyError::Dial(_))));
    }

    #[tokio::test]
    async fn test_dial_times_out_on_silent_server() {
        // Accepts TCP but never answers the handshake
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let dialer = UpstreamDialer::new(format!("ws://{addr}"), "key")
            .with_connect_timeout(Duration::from_millis(200));
        assert!(matches!(
            dialer.dial().await,
            Err(ProxyError::DialTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let dialer = UpstreamDialer::new("not a url", "key");
        assert!(matches!(
            dialer.dial().await,
            Err(ProxyError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_dial_sends_token_authorization() {
        use tokio_tungstenite::accept_hdr_async;
        use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut seen = None;
            let _ws = accept_hdr_async(socket, |req: &Request, resp: Response| {
                seen = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                Ok(resp)
            })
            .await
            .unwrap();
            let _ = tx.send(seen);
        });

        let dialer = UpstreamDialer::new(format!("ws://{addr}"), "dg-secret");
        let _stream = dialer.dial().await.unwrap();

        assert_eq!(rx.await.unwrap().as_deref(), Some("Token dg-secret"));
    }
}
