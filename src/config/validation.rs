use url::Url;

use super::ServerConfig;

/// Validate a fully merged configuration.
pub(super) fn validate(config: &ServerConfig) -> Result<(), String> {
    validate_api_key(&config.deepgram_api_key)?;
    validate_agent_url(&config.deepgram_agent_url)?;
    validate_positive(
        "UPSTREAM_CONNECT_TIMEOUT_SECONDS",
        config.upstream_connect_timeout_seconds,
    )?;
    validate_positive("SESSION_TTL_SECONDS", config.session_ttl_seconds)?;
    validate_positive("SHUTDOWN_TIMEOUT_SECONDS", config.shutdown_timeout_seconds)?;
    Ok(())
}

fn validate_api_key(api_key: &str) -> Result<(), String> {
    if api_key.trim().is_empty() {
        return Err(
            "DEEPGRAM_API_KEY is required. Copy sample.env to .env and set your Deepgram API key"
                .to_string(),
        );
    }
    Ok(())
}

fn validate_agent_url(agent_url: &str) -> Result<(), String> {
    let url = Url::parse(agent_url)
        .map_err(|e| format!("Invalid DEEPGRAM_AGENT_URL '{agent_url}': {e}"))?;

    match url.scheme() {
        "ws" | "wss" => Ok(()),
        scheme => Err(format!(
            "Invalid DEEPGRAM_AGENT_URL '{agent_url}': scheme must be ws or wss, got {scheme}"
        )),
    }
}

fn validate_positive(name: &str, value: u64) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{name} must be greater than 0"));
    }
    Ok(())
}
