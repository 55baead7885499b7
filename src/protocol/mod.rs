//! Line Protocol Implementation
//!
//! This module implements the plain-text protocol spoken by linekv clients.
//!
//! ## Overview
//!
//! One command per line, tokens separated by a single space, lines
//! terminated by `\n`. There is no handshake, length prefix or binary framing.
//!
//! ## Modules
//!
//! - `types`: Defines the `Command` and `Reply` enums and reply serialization
//! - `parser`: Converts a text line into a `Command`
//!
//! ## Example
//!
//! ```
//! use linekv::protocol::{parse_line, Command, Reply};
//!
//! let cmd = parse_line("GET name").unwrap();
//! assert_eq!(cmd, Command::Get { key: "name".into() });
//!
//! let bytes = Reply::NotFound("name".into()).serialize();
//! assert_eq!(&bytes[..], b"key name not found\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_line, ParseError, ParseResult};
pub use types::{Command, Reply};
