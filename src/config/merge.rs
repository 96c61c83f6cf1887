use std::path::PathBuf;

use super::ServerConfig;
use super::yaml::YamlConfig;

/// Overlay every value present in the YAML file onto `config`.
pub(super) fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) {
    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
    }

    if let Some(deepgram) = yaml.deepgram {
        if let Some(api_key) = deepgram.api_key {
            config.deepgram_api_key = api_key;
        }
        if let Some(agent_url) = deepgram.agent_url {
            config.deepgram_agent_url = agent_url;
        }
        if let Some(timeout) = deepgram.connect_timeout_seconds {
            config.upstream_connect_timeout_seconds = timeout;
        }
    }

    if let Some(session) = yaml.session {
        if let Some(secret) = session.secret.filter(|s| !s.is_empty()) {
            config.session_secret = Some(secret);
        }
        if let Some(ttl) = session.ttl_seconds {
            config.session_ttl_seconds = ttl;
        }
    }

    if let Some(path) = yaml.metadata.and_then(|m| m.path) {
        config.metadata_path = PathBuf::from(path);
    }

    if let Some(origins) = yaml.security.and_then(|s| s.cors_allowed_origins) {
        config.cors_allowed_origins = origins;
    }

    if let Some(timeout) = yaml.shutdown.and_then(|s| s.timeout_seconds) {
        config.shutdown_timeout_seconds = timeout;
    }
}
