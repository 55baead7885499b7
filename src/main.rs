//! linekv - An In-Memory Key-Value Store over a Line Protocol
//!
//! This is the main entry point for the linekv server.
//! It sets up logging, the storage engine, the reaper and the TCP listener.

use clap::Parser;
use linekv::connection::ConnectionStats;
use linekv::server::{accept_loop, bind};
use linekv::storage::{Reaper, StorageEngine};
use linekv::Config;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    println!(
        r#"
linekv v{} - In-Memory Key-Value Store
──────────────────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        linekv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Create the storage engine (shared across all connections)
    let policy = config.ttl_policy();
    let storage = Arc::new(StorageEngine::with_policy(policy));
    info!(ttl = ?policy, "Storage engine initialized");

    // Start the background reaper only if keys can expire
    let _reaper = if policy.is_enabled() {
        Some(Reaper::start(Arc::clone(&storage), config.reaper_config()))
    } else {
        warn!("TTL disabled, keys are kept until deleted");
        None
    };

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener; failure here is fatal
    let listener = bind(&config.bind_address()).await?;
    info!("Server listening on {}", config.bind_address());

    print_banner(&config);

    // Set up graceful shutdown
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C, running until killed");
                std::future::pending::<()>().await;
            }
        }
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&storage), stats) => {}
        _ = shutdown => {}
    }

    info!(keys = storage.len(), "Server shutdown complete");
    Ok(())
}
