//! Background Reaper
//!
//! This module implements a background task that periodically removes
//! expired keys from the storage engine.
//!
//! Reads already hide expired entries, but an entry that is never read again
//! would otherwise stay in memory forever. The reaper reclaims it.
//!
//! ## Design
//!
//! The reaper runs as a Tokio task and:
//! 1. Waits for the next tick of a fixed interval (default: 10s)
//! 2. Calls [`StorageEngine::sweep_expired`]
//! 3. Logs how many keys were removed
//!
//! It talks to the engine only through that public operation and stops when
//! its handle is dropped.

use crate::storage::StorageEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Default interval between sweeps.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for the reaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperConfig {
    /// Interval between sweeps (default: 10s)
    pub interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REAP_INTERVAL,
        }
    }
}

impl ReaperConfig {
    /// Sets the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// A handle to the running reaper.
///
/// When this handle is dropped, the reaper task will be stopped.
#[derive(Debug)]
pub struct Reaper {
    shutdown_tx: watch::Sender<bool>,
}

impl Reaper {
    /// Starts the reaper as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use linekv::storage::{Reaper, ReaperConfig, StorageEngine};
    /// use std::sync::Arc;
    ///
    /// let engine = Arc::new(StorageEngine::new());
    /// let reaper = Reaper::start(engine, ReaperConfig::default());
    ///
    /// // Dropping the handle stops the task
    /// drop(reaper);
    /// ```
    pub fn start(engine: Arc<StorageEngine>, config: ReaperConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            interval_ms = config.interval.as_millis() as u64,
            "Background reaper started"
        );

        tokio::spawn(reaper_loop(engine, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Stops the reaper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let already_stopped = self.shutdown_tx.send_replace(true);
        if !already_stopped {
            info!("Background reaper stopped");
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn reaper_loop(
    engine: Arc<StorageEngine>,
    config: ReaperConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Reaper received shutdown signal");
                    return;
                }
            }
        }

        debug!("Cleaning up expired keys");
        let expired = engine.sweep_expired();

        info!(
            expired = expired,
            keys_remaining = engine.len(),
            "Deleted expired keys"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TtlPolicy;

    fn fast_config() -> ReaperConfig {
        ReaperConfig::default().with_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_default_config() {
        assert_eq!(ReaperConfig::default().interval, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_keys() {
        let engine = Arc::new(StorageEngine::with_policy(TtlPolicy::Fixed(
            Duration::from_millis(30),
        )));

        for i in 0..10 {
            engine.put(format!("key{}", i), "value".to_string());
        }
        assert_eq!(engine.len(), 10);

        let _reaper = Reaper::start(Arc::clone(&engine), fast_config());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(engine.is_empty());
        assert_eq!(engine.stats().expired, 10);
    }

    #[tokio::test]
    async fn test_reaper_keeps_live_keys() {
        let engine = Arc::new(StorageEngine::with_policy(TtlPolicy::Fixed(
            Duration::from_secs(60),
        )));
        engine.put("live".to_string(), "value".to_string());

        let _reaper = Reaper::start(Arc::clone(&engine), fast_config());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(engine.get("live"), Some("value".to_string()));
        assert_eq!(engine.len(), 1);
    }

    #[tokio::test]
    async fn test_reaper_stops_on_drop() {
        let engine = Arc::new(StorageEngine::with_policy(TtlPolicy::Fixed(
            Duration::from_millis(10),
        )));

        {
            let _reaper = Reaper::start(Arc::clone(&engine), fast_config());
            tokio::time::sleep(Duration::from_millis(50)).await;
            // Reaper is dropped here
        }

        engine.put("key".to_string(), "value".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Nothing swept the entry, reads still hide it
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.get("key"), None);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let engine = Arc::new(StorageEngine::new());
        let reaper = Reaper::start(engine, ReaperConfig::default());

        reaper.stop();
        reaper.stop();
    }
}
