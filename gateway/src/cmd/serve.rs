//! `gateway serve` command: start the HTTP server.
//!
//! Reads the TOML configuration, builds the chain registry and backend
//! clients, then serves the router until a shutdown signal arrives.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use dotenvy::dotenv;

use crate::backend::Backends;
use crate::chain::ChainRegistry;
use crate::config::load_config;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::routes::AppState;
use crate::server;
use crate::shutdown::on_shutdown_signal;
use crate::telemetry::{Telemetry, http_trace_layer};

/// Execute the `serve` command.
///
/// # Errors
///
/// Returns an error if configuration loading, registry construction,
/// backend client construction, or server binding fails.
pub async fn run(config_path: &Path) -> Result<(), Error> {
    // Another component may already have installed a provider.
    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::ring::default_provider(),
    );

    dotenv().ok();

    let config = load_config(config_path)?;

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_log_level(config.log_level.clone())
        .register();

    let registry = Arc::new(ChainRegistry::from_config(&config.chains)?);
    if config.backends.rpc_api_key.is_none() {
        for chain in registry.list().iter().filter(|c| c.rpc_needs_api_key()) {
            tracing::warn!(
                chain_id = chain.chain_id,
                "RPC URL needs an API key but backends.rpc_api_key is unset; RPC calls on this chain will fail"
            );
        }
    }
    let backends = Backends::from_config(&config.backends)?;

    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(Arc::clone(&registry), backends)),
        policy: config.error_status,
    };
    let app = server::app(state).layer(http_trace_layer());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {addr}: {e}"))
        .map_err(|e| Error::server_with(format!("failed to bind {addr}"), e))?;
    tracing::info!(
        chains = registry.len(),
        error_status = ?config.error_status,
        "Starting server at http://{addr}"
    );

    let shutdown = on_shutdown_signal()
        .map_err(|e| Error::server_with("failed to register signal handlers", e))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::server_with("server error", e))?;

    tracing::info!("Server stopped");
    Ok(())
}
