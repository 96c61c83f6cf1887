use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::ServerConfig;
use crate::core::proxy::upstream::DEFAULT_AGENT_URL;

pub(super) const DEFAULT_HOST: &str = "0.0.0.0";
pub(super) const DEFAULT_PORT: u16 = 8081;
pub(super) const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 10;
pub(super) const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;
pub(super) const DEFAULT_METADATA_PATH: &str = "deepgram.toml";
pub(super) const DEFAULT_SHUTDOWN_TIMEOUT_SECONDS: u64 = 10;

/// Build a configuration from environment variables, falling back to defaults.
///
/// A missing `DEEPGRAM_API_KEY` is left empty here; validation reports it
/// after YAML overrides have been applied.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    Ok(ServerConfig {
        host: env_or("HOST", DEFAULT_HOST),
        port: parse_env("PORT", DEFAULT_PORT)?,
        deepgram_api_key: env_or("DEEPGRAM_API_KEY", ""),
        deepgram_agent_url: env_or("DEEPGRAM_AGENT_URL", DEFAULT_AGENT_URL),
        upstream_connect_timeout_seconds: parse_env(
            "UPSTREAM_CONNECT_TIMEOUT_SECONDS",
            DEFAULT_CONNECT_TIMEOUT_SECONDS,
        )?,
        session_secret: env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()),
        session_ttl_seconds: parse_env("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?,
        metadata_path: PathBuf::from(env_or("METADATA_PATH", DEFAULT_METADATA_PATH)),
        cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", "*"),
        shutdown_timeout_seconds: parse_env(
            "SHUTDOWN_TIMEOUT_SECONDS",
            DEFAULT_SHUTDOWN_TIMEOUT_SECONDS,
        )?,
    })
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {key} value '{value}': {e}").into()),
        Err(_) => Ok(default),
    }
}
