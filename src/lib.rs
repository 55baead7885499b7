//! # linekv - An In-Memory Key-Value Store over a Line Protocol
//!
//! linekv keeps opaque text values in memory and serves them over a plain
//! text TCP protocol, one command per line. Written keys can carry a fixed
//! time-to-live, after which a background reaper removes them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              linekv                              │
//! │                                                                  │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐           │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │           │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │           │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘           │
//! │                            │                  │                  │
//! │                            ▼                  ▼                  │
//! │                     ┌─────────────┐    ┌──────────────────────┐  │
//! │                     │ Line Parser │    │    StorageEngine     │  │
//! │                     └─────────────┘    │ RwLock<HashMap<..>>  │  │
//! │                                        └──────────▲───────────┘  │
//! │                                                   │              │
//! │                                        ┌──────────┴───────────┐  │
//! │                                        │        Reaper        │  │
//! │                                        │ (Background Task)    │  │
//! │                                        └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use linekv::server::accept_loop;
//! use linekv::storage::{Reaper, ReaperConfig, StorageEngine, TtlPolicy, DEFAULT_TTL};
//! use linekv::connection::ConnectionStats;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(StorageEngine::with_policy(TtlPolicy::Fixed(DEFAULT_TTL)));
//!     let _reaper = Reaper::start(Arc::clone(&storage), ReaperConfig::default());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("localhost:8080").await?;
//!     accept_loop(listener, storage, stats).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `GET key` - replies `value`, or `key <key> not found`
//! - `PUT key value` - no reply
//! - `DEL key` - no reply
//! - `LIST` - replies one `key=value` line per entry, in no particular order
//!
//! Keywords are case-insensitive. Values cannot contain spaces. A known
//! command with the wrong number of arguments gets an `Invalid <cmd> command`
//! line; an unknown keyword is logged and ignored.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line parser, commands and replies
//! - [`storage`]: Thread-safe storage engine with TTL support and the reaper
//! - [`commands`]: Applies commands to the storage engine
//! - [`connection`]: Client connection management
//! - [`server`]: The accept loop
//! - [`config`]: Command-line configuration

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_line, Command, ParseError, Reply};
pub use storage::{Reaper, ReaperConfig, StorageEngine, TtlPolicy};

/// The default port linekv listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host linekv binds to
pub const DEFAULT_HOST: &str = "localhost";

/// Version of linekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
