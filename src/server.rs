//! Router assembly and the server lifecycle.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tokio::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::core::proxy::ConnectionRegistry;
use crate::routes;
use crate::state::AppState;

/// Build the complete application: routes, auth, CORS and security headers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors_layer = cors_layer(&state.config);

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    routes::api::create_api_router()
        .merge(routes::voice_agent::create_voice_agent_router(
            state.clone(),
        ))
        .with_state(state)
        .layer(cors_layer)
        .layer(security_headers)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match config.cors_origin_list() {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
    }
}

/// Serve `app` until `signal` resolves, then shut down gracefully.
///
/// On the signal the listener stops accepting, every live client gets close
/// 1001 `Server shutting down`, and in-flight handlers get the rest of
/// `timeout` to finish before the server task is aborted. Sessions that were
/// upgraded while the listener drained get the same close. The broadcast
/// shares the `timeout` deadline, so a client that stopped reading cannot
/// hold shutdown open. A server error before the signal is returned.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    registry: Arc<ConnectionRegistry>,
    signal: F,
    timeout: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        })
        .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = signal => {}
    }

    info!("Shutting down server...");
    let deadline = Instant::now() + timeout;
    let _ = stop_tx.send(());

    broadcast_shutdown(&registry, deadline).await;

    let result = match tokio::time::timeout_at(deadline, &mut server).await {
        Ok(result) => {
            info!("Server stopped");
            flatten(result)
        }
        Err(_) => {
            warn!("Server did not stop within {timeout:?}, aborting");
            server.abort();
            Ok(())
        }
    };

    if !registry.is_empty() {
        broadcast_shutdown(&registry, deadline).await;
    }

    result
}

async fn broadcast_shutdown(registry: &ConnectionRegistry, deadline: Instant) {
    if tokio::time::timeout_at(deadline, registry.close_all())
        .await
        .is_err()
    {
        warn!(
            remaining = registry.len(),
            "Shutdown close broadcast did not finish before the deadline"
        );
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    result.map_err(io::Error::other)?
}

/// Resolve on SIGINT (ctrl-c) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (ctrl-c)"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
