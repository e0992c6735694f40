#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use authkit_server::{AppState, handler};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Cli;

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "authkit_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "authkit_cli::server::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "authkit_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    log_startup_info(&cli);

    // Signer/hasher misconfiguration (e.g. an undersized secret) aborts
    // here, before the listener binds.
    let (state, _store) =
        AppState::with_memory_store(&cli.auth).context("invalid authentication configuration")?;

    let app = create_router(state);
    server::serve(app, cli.server).await?;

    Ok(())
}

/// Creates the router with tracing applied around the handlers.
fn create_router(state: AppState) -> Router {
    handler::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Logs startup information.
fn log_startup_info(cli: &Cli) {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting authkit server"
    );

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        host = %cli.server.host,
        port = cli.server.port,
        shutdown_timeout_secs = cli.server.shutdown_timeout,
        token_ttl_hours = cli.auth.token_ttl_hours,
        "configuration loaded"
    );
}
