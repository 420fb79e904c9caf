//! # Payment Gateway Server
//!
//! Standalone binary running one gateway replica.
//!
//! ## Usage
//!
//! ```bash
//! # Leader with defaults from config/gateway.toml
//! cargo run --bin payment-gateway
//!
//! # Follower reading health from a leader
//! GATEWAY__REPLICA__ROLE=follower \
//! GATEWAY__REPLICA__LEADER_URL=http://gateway-1:8080 \
//!   cargo run --bin payment-gateway
//! ```

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use payment_gateway::bootstrap::GatewayBootstrap;
use payment_gateway::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("🚀 Starting Payment Gateway...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );

    let handle = GatewayBootstrap::bootstrap()
        .await
        .context("Failed to bootstrap payment gateway")?;

    info!("🎉 Payment Gateway listening on {}", handle.local_addr());
    info!("   Replica role: {}", handle.coordinator().role());
    info!("   Press Ctrl+C to shutdown gracefully");

    shutdown_signal().await;

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");
    if let Err(e) = handle.stop().await {
        error!("Failed to stop gateway cleanly: {}", e);
    }

    info!("👋 Payment Gateway shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
