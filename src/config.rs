//! Server configuration, parsed from the command line.

use crate::storage::{ReaperConfig, TtlPolicy};
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;

/// Server configuration
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "linekv",
    version,
    about = "An in-memory key-value store served over a line-oriented TCP protocol"
)]
pub struct Config {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds a written key lives before it may be reaped
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub ttl_secs: u64,

    /// Keep keys forever and do not run the reaper
    #[arg(long)]
    pub no_ttl: bool,

    /// Seconds between reaper sweeps
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub reap_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ttl_secs: 300,
            no_ttl: false,
            reap_interval_secs: 10,
        }
    }
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the TTL policy for the storage engine.
    pub fn ttl_policy(&self) -> TtlPolicy {
        if self.no_ttl {
            TtlPolicy::Disabled
        } else {
            TtlPolicy::Fixed(Duration::from_secs(self.ttl_secs))
        }
    }

    /// Returns the reaper configuration.
    pub fn reaper_config(&self) -> ReaperConfig {
        ReaperConfig::default().with_interval(Duration::from_secs(self.reap_interval_secs))
    }
}
