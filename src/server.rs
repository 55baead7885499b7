//! TCP Listener
//!
//! Accepts client connections and spawns one [`handle_connection`] task per
//! connection. Accept errors are logged and the loop keeps going; a bind
//! failure is returned to the caller so that it can abort startup.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error};

/// Binds the listening socket.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to start server listener on {}", addr))
}

/// Main loop that accepts incoming connections. Never returns.
pub async fn accept_loop(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(client = %addr, "Handling a request");

                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
