use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8081
///
/// deepgram:
///   api_key: "your-deepgram-key"
///   agent_url: "wss://agent.deepgram.com/v1/agent/converse"
///   connect_timeout_seconds: 10
///
/// session:
///   secret: "long-random-string"
///   ttl_seconds: 3600
///
/// metadata:
///   path: "deepgram.toml"
///
/// security:
///   cors_allowed_origins: "https://app.example.com"
///
/// shutdown:
///   timeout_seconds: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub deepgram: Option<DeepgramYaml>,
    pub session: Option<SessionYaml>,
    pub metadata: Option<MetadataYaml>,
    pub security: Option<SecurityYaml>,
    pub shutdown: Option<ShutdownYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Voice agent upstream settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeepgramYaml {
    pub api_key: Option<String>,
    pub agent_url: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
}

/// Session token settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYaml {
    pub secret: Option<String>,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MetadataYaml {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ShutdownYaml {
    pub timeout_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
