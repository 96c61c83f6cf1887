use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use voice_agent_proxy::{ServerConfig, server, state::AppState};

/// Voice Agent Proxy - authenticated WebSocket relay to the Deepgram Voice Agent API
#[derive(Parser, Debug)]
#[command(name = "voice-agent-proxy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for the outbound wss connection
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    let address = config.address();
    let shutdown_timeout = config.shutdown_timeout();

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    let app_state = AppState::new(config);
    let registry = app_state.registry.clone();
    let app = server::build_router(app_state);

    let listener = TcpListener::bind(&socket_addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", socket_addr, e))?;

    info!("Server listening on http://{}", socket_addr);
    info!("  GET  /api/session     - issue a session token");
    info!("  GET  /api/metadata    - project metadata");
    info!("  GET  /health          - health check");
    info!("  WS   /api/voice-agent - voice agent relay");

    server::serve_with_shutdown(
        listener,
        app,
        registry,
        server::shutdown_signal(),
        shutdown_timeout,
    )
    .await?;

    Ok(())
}
