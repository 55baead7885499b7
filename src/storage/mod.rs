//! Storage Engine Module
//!
//! This module provides the core storage functionality for linekv:
//! a thread-safe key-value map with optional TTL and a background reaper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           StorageEngine             │
//! │   RwLock<HashMap<String, Entry>>    │
//! └─────────────────────────────────────┘
//!                   ▲
//!                   │ sweep_expired()
//!     ┌─────────────┴─────────────┐
//!     │          Reaper           │
//!     │  (Background Tokio Task)  │
//!     └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use linekv::storage::{StorageEngine, TtlPolicy};
//! use std::time::Duration;
//!
//! let engine = StorageEngine::with_policy(TtlPolicy::Fixed(Duration::from_secs(300)));
//!
//! engine.put("name".to_string(), "linekv".to_string());
//! assert_eq!(engine.get("name"), Some("linekv".to_string()));
//!
//! let snapshot = engine.list();
//! assert_eq!(snapshot.len(), 1);
//! ```

pub mod engine;
pub mod expiry;

// Re-export commonly used types
pub use engine::{Entry, StorageEngine, StorageStats, TtlPolicy, DEFAULT_TTL};
pub use expiry::{Reaper, ReaperConfig, DEFAULT_REAP_INTERVAL};
