//! Command Handler Module
//!
//! This module applies parsed commands to the storage engine and builds the
//! reply for each one.
//!
//! ## Supported Commands
//!
//! - `GET key` - Reply with the value, or `key <key> not found`
//! - `PUT key value` - Store a value, no reply
//! - `DEL key` - Delete a key, no reply
//! - `LIST` - Reply with every `key=value` pair
//!
//! Unknown keywords are logged and produce no reply.

use crate::protocol::{Command, ParseError, ParseResult, Reply};
use crate::storage::StorageEngine;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes commands against a shared storage engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Executes the outcome of parsing one line.
    ///
    /// Malformed commands become an error reply; the connection carries on.
    pub fn execute_parsed(&self, parsed: ParseResult<Command>) -> Reply {
        match parsed {
            Ok(command) => self.execute(command),
            Err(e) => {
                let ParseError::Malformed { tokens, .. } = &e;
                warn!(error = %e, tokens = *tokens, "Malformed command");
                Reply::error(e.to_string())
            }
        }
    }

    /// Executes a command and returns the reply.
    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Get { key } => self.cmd_get(key),
            Command::Put { key, value } => self.cmd_put(key, value),
            Command::Del { key } => self.cmd_del(&key),
            Command::List => self.cmd_list(),
            Command::Unknown(keyword) => {
                warn!(command = %keyword, "Unknown command");
                Reply::Silent
            }
        }
    }

    fn cmd_get(&self, key: String) -> Reply {
        match self.storage.get(&key) {
            Some(value) => Reply::Value(value),
            None => {
                debug!(key = %key, "GET miss");
                Reply::NotFound(key)
            }
        }
    }

    fn cmd_put(&self, key: String, value: String) -> Reply {
        let created = self.storage.put(key, value);
        debug!(created, "PUT");
        Reply::Silent
    }

    fn cmd_del(&self, key: &str) -> Reply {
        let removed = self.storage.delete(key);
        debug!(key = %key, removed, "DEL");
        Reply::Silent
    }

    fn cmd_list(&self) -> Reply {
        let pairs: Vec<(String, String)> = self.storage.list().into_iter().collect();
        debug!(count = pairs.len(), "LIST");
        Reply::Pairs(pairs)
    }
}
