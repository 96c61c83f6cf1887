use std::sync::Arc;

use tracing::info;

use crate::auth::{SessionSecret, SessionTokenService};
use crate::config::ServerConfig;
use crate::core::proxy::{ConnectionRegistry, UpstreamDialer};

/// Application state shared by every handler
pub struct AppState {
    pub config: ServerConfig,
    pub tokens: SessionTokenService,
    pub registry: Arc<ConnectionRegistry>,
    pub dialer: UpstreamDialer,
}

impl AppState {
    /// Build the shared state from a validated configuration.
    ///
    /// When no session secret is configured a random one is generated, so
    /// tokens issued by this process are rejected after a restart.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let secret = match config.session_secret.as_deref() {
            Some(secret) => SessionSecret::new(secret.as_bytes().to_vec()),
            None => {
                info!("SESSION_SECRET not set, using a random per-process session secret");
                SessionSecret::generate()
            }
        };

        let tokens = SessionTokenService::new(secret).with_expiry(config.session_ttl());

        let dialer = UpstreamDialer::new(
            config.deepgram_agent_url.clone(),
            config.deepgram_api_key.clone(),
        )
        .with_connect_timeout(config.upstream_connect_timeout());

        Arc::new(Self {
            config,
            tokens,
            registry: Arc::new(ConnectionRegistry::new()),
            dialer,
        })
    }
}
