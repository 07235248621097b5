//! Serve command: the HTTP read API

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{build_router, AppState};
use crate::cli::{GlobalArgs, ServeArgs};
use crate::commands::common::Session;

/// Execute the serve command
pub(crate) async fn execute(args: &ServeArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let host = args.host.clone().unwrap_or_else(|| session.config.server.host.clone());
    let port = args.port.unwrap_or(session.config.server.port);
    let cors = session.config.server.cors_allow_any;

    let state = AppState::new(Arc::new(session.db), Arc::new(session.config));
    let app = build_router(state, cors);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("Invalid host:port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;

    log::info!("Serving County Health Explorer API at http://{host}:{port}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
