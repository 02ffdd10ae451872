//! HTTP server startup.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::ServerConfig;
use crate::server::lifecycle::{log_suggestion, serve_with_shutdown};
use crate::server::shutdown::shutdown_signal;
use crate::server::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get the configured shutdown timeout
/// to finish before the server stops waiting for them.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while accepting connections.
pub async fn serve(app: Router, server_config: &ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let error = ServerError::bind(server_addr, source);
            tracing::error!(
                target: TRACING_TARGET_SERVER_STARTUP,
                addr = %server_addr,
                error = %error,
                "Failed to bind to address"
            );
            log_suggestion(&error);
            return Err(error);
        }
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    let signalled = Arc::new(Notify::new());

    serve_with_shutdown(server_config, || async move {
        let graceful = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown({
            let signalled = Arc::clone(&signalled);
            async move {
                shutdown_signal().await;
                signalled.notify_one();
            }
        })
        .into_future();

        let deadline = async {
            signalled.notified().await;
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown initiated"
            );
            tokio::time::sleep(shutdown_timeout).await;
        };

        tokio::select! {
            result = graceful => result.map_err(ServerError::Runtime),
            () = deadline => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed, dropping in-flight requests"
                );
                Ok(())
            }
        }
    })
    .await
}
