#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storyline HTTP server binary.

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use storyline_server::handler::routes;
use storyline_server::middleware::{RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt};
use storyline_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "storyline_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "storyline_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "storyline_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service).await?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, &cli.server).await?;

    Ok(())
}

/// Connects to the database and loads the session keys.
async fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// Layers added last wrap the ones added before them:
/// 1. Observability (outermost), request IDs and tracing spans
/// 2. Recovery, catches panics and enforces the request timeout
/// 3. Routes (innermost), the comment handlers and the OpenAPI document
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(&middleware.openapi)
        .with_state(state)
        .with_recovery(&middleware.recovery)
        .with_observability()
}
