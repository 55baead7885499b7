//! Thread-Safe Storage Engine with Expiry Support
//!
//! This module implements the core storage engine for linekv.
//! It provides a concurrent HashMap with optional TTL (Time-To-Live) support.
//!
//! ## Design Decisions
//!
//! 1. **Single RwLock**: One reader/writer lock guards the whole map. Reads
//!    (`get`, `list`) run in parallel, writes (`put`, `delete`,
//!    `sweep_expired`) are exclusive.
//! 2. **Owned Results**: Nothing outside the engine ever borrows into the map.
//!    Every operation returns copies.
//! 3. **Explicit TTL Policy**: Expiry is either disabled or a fixed window
//!    applied on every write. See [`TtlPolicy`].
//! 4. **Read-Side Filtering**: `get` and `list` hide expired entries without
//!    removing them. Removal is the reaper's job.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                StorageEngine                │
//! │  ┌───────────────────────────────────────┐  │
//! │  │  RwLock<HashMap<String, Entry>>       │  │
//! │  │   readers: get, list, len             │  │
//! │  │   writers: put, delete, sweep_expired │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// TTL window applied by the server binary unless disabled.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// How the engine assigns expiry times on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtlPolicy {
    /// Entries never expire.
    #[default]
    Disabled,
    /// Every `put` sets the expiry to now + the given window.
    Fixed(Duration),
}

impl TtlPolicy {
    /// Computes the expiry instant for an entry written at `now`.
    #[inline]
    fn expiry_from(&self, now: Instant) -> Option<Instant> {
        match self {
            TtlPolicy::Disabled => None,
            TtlPolicy::Fixed(window) => now.checked_add(*window),
        }
    }

    /// Returns true if entries written under this policy can expire.
    pub fn is_enabled(&self) -> bool {
        matches!(self, TtlPolicy::Fixed(_))
    }
}

/// Represents a stored value with optional expiry time.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The actual value stored
    pub value: String,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates an entry written at `now` under `policy`.
    pub fn written_at(value: String, policy: TtlPolicy, now: Instant) -> Self {
        Self {
            value,
            expires_at: policy.expiry_from(now),
        }
    }

    /// Checks if this entry has expired as of `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Checks if this entry has expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Snapshot of the engine's operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub keys: u64,
    pub get_ops: u64,
    pub put_ops: u64,
    pub del_ops: u64,
    pub expired: u64,
}

/// The main storage engine for linekv.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all client handler tasks and the reaper. All operations are thread-safe.
///
/// # Example
///
/// ```
/// use linekv::storage::StorageEngine;
///
/// let engine = StorageEngine::new();
///
/// engine.put("name".to_string(), "linekv".to_string());
/// assert_eq!(engine.get("name"), Some("linekv".to_string()));
///
/// engine.delete("name");
/// assert_eq!(engine.get("name"), None);
/// ```
pub struct StorageEngine {
    data: RwLock<HashMap<String, Entry>>,

    ttl_policy: TtlPolicy,

    get_count: AtomicU64,
    put_count: AtomicU64,
    del_count: AtomicU64,
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("ttl_policy", &self.ttl_policy)
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("put_count", &self.put_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an engine whose entries never expire.
    pub fn new() -> Self {
        Self::with_policy(TtlPolicy::Disabled)
    }

    /// Creates an engine that applies `ttl_policy` on every write.
    pub fn with_policy(ttl_policy: TtlPolicy) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            ttl_policy,
            get_count: AtomicU64::new(0),
            put_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    /// Returns the TTL policy this engine was created with.
    pub fn ttl_policy(&self) -> TtlPolicy {
        self.ttl_policy
    }

    // Every write is a single HashMap call, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key doesn't exist or has expired. Expired
    /// entries are left in place for the reaper.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let data = self.read();
        data.get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites a key, refreshing its expiry per the TTL policy.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn put(&self, key: String, value: String) -> bool {
        self.put_count.fetch_add(1, Ordering::Relaxed);

        let entry = Entry::written_at(value, self.ttl_policy, Instant::now());

        let mut data = self.write();
        data.insert(key, entry).is_none()
    }

    /// Deletes a key. Deleting a missing key is not an error.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.write();
        data.remove(key).is_some()
    }

    /// Returns an owned snapshot of every non-expired key and its value.
    pub fn list(&self) -> HashMap<String, String> {
        let now = Instant::now();
        let data = self.read();

        data.iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Removes every entry whose expiry has passed.
    ///
    /// This is called by the background reaper.
    ///
    /// # Returns
    ///
    /// Returns the number of keys that were removed.
    pub fn sweep_expired(&self) -> u64 {
        let now = Instant::now();
        let mut data = self.write();

        let before = data.len();
        data.retain(|_, entry| !entry.is_expired_at(now));
        let removed = (before - data.len()) as u64;
        drop(data);

        if removed > 0 {
            self.expired_count.fetch_add(removed, Ordering::Relaxed);
        }

        removed
    }

    /// Returns the number of stored entries, including expired ones the
    /// reaper has not removed yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns engine statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            put_ops: self.put_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}
