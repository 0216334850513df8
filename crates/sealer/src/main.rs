//! `sealer` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from the config file and environment.
//! 2. Initialise logging (and OTLP export when configured).
//! 3. Load the key pair from disk, generating and persisting one if absent.
//! 4. Build the Axum router and serve until Ctrl-C / SIGTERM.

use anyhow::{Context, Result};
use tracing::info;

use sealer::config::Config;
use sealer::server::{self, state::AppState};
use sealer::{keys, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::load().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "sealer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key pair
    // -----------------------------------------------------------------------
    // Generation is CPU-bound; keep it off the async workers.
    let key_cfg = cfg.clone();
    let keys = tokio::task::spawn_blocking(move || keys::provision(&key_cfg))
        .await
        .context("key provisioning task panicked")??;
    info!(key_bits = keys.bits(), "key pair ready");

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(keys));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sealer stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
