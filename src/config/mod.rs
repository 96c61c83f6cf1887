//! Configuration module for the voice-agent proxy
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voice_agent_proxy::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

/// Server configuration
///
/// Holds everything the proxy needs at startup:
/// - Listen address
/// - Voice-agent credentials and endpoint
/// - Session token settings
/// - Metadata file location
/// - CORS and shutdown settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Voice agent upstream
    pub deepgram_api_key: String,
    pub deepgram_agent_url: String,
    pub upstream_connect_timeout_seconds: u64,

    // Session tokens. A random secret is generated at startup when unset,
    // so tokens do not survive a restart.
    pub session_secret: Option<String>,
    pub session_ttl_seconds: u64,

    /// TOML file whose `[meta]` table is served at `/api/metadata`
    pub metadata_path: PathBuf,

    /// `*` for any origin, otherwise a comma-separated list
    pub cors_allowed_origins: String,

    /// How long in-flight handlers get after the shutdown broadcast
    pub shutdown_timeout_seconds: u64,
}

/// Zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.deepgram_api_key.zeroize();
        if let Some(ref mut secret) = self.session_secret {
            secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails
    /// (most commonly a missing `DEEPGRAM_API_KEY`).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = env::load_from_env()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (including values loaded from `.env` in `main`)
    /// provide the base configuration and YAML values override them.
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let mut config = env::load_from_env()?;
        merge::apply_yaml(&mut config, yaml_config);

        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_connect_timeout_seconds)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Allowed CORS origins, or `None` when any origin is allowed
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins = self.cors_allowed_origins.trim();
        if origins == "*" {
            return None;
        }
        Some(
            origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}
