//! SecureWatch Web Server
//!
//! Run with: cargo run -p securewatch-web

use securewatch_web::config::Config;
use securewatch_web::router::build_router;
use securewatch_web::state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("securewatch_web=debug,securewatch_feed=debug,securewatch_intel=debug,info")),
        )
        .init();

    info!("Starting SecureWatch Web Server...");

    let config = Config::load()?;
    let addr = config.server.socket_addr()?;

    let state = Arc::new(AppState::new(config));
    let background = state.spawn_background();
    let app = build_router(state.clone());

    info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open SSE streams only end once their sessions and the event
            // stream are closed.
            shutdown_state.shutdown().await;
        })
        .await?;

    for task in background {
        let _ = task.await;
    }
    info!("SecureWatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
