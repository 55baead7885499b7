//! Line Protocol Data Types
//!
//! This module defines the commands a client can send and the replies the
//! server writes back.
//!
//! ## Protocol Format
//!
//! Every request is one line of space-separated tokens terminated by `\n`.
//! Every reply is zero or more lines, each terminated by `\n`.
//!
//! ## Examples
//!
//! ```text
//! PUT a 1        (no reply)
//! GET a          -> 1
//! GET missing    -> key missing not found
//! DEL a          (no reply)
//! LIST           -> x=1
//!                   y=2
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Line terminator used for both requests and replies.
pub const LF: u8 = b'\n';

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET key`
    Get { key: String },
    /// `PUT key value`
    Put { key: String, value: String },
    /// `DEL key`
    Del { key: String },
    /// `LIST`
    List,
    /// Any unrecognised keyword, kept for logging.
    Unknown(String),
}

/// A reply written back to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing is written (`PUT`, `DEL`, unknown commands).
    Silent,
    /// A found value: `<value>\n`
    Value(String),
    /// A missing key: `key <key> not found\n`
    NotFound(String),
    /// Snapshot listing: one `<key>=<value>\n` per pair.
    Pairs(Vec<(String, String)>),
    /// A human-readable error line.
    Error(String),
}

impl Reply {
    /// Creates an error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(msg.into())
    }

    /// Returns true if this reply writes nothing.
    pub fn is_silent(&self) -> bool {
        match self {
            Reply::Silent => true,
            Reply::Pairs(pairs) => pairs.is_empty(),
            _ => false,
        }
    }

    /// Serializes the reply to its wire form.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.serialize_into(&mut buf);
        buf.freeze()
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut BytesMut) {
        match self {
            Reply::Silent => {}
            Reply::Value(value) => {
                buf.put_slice(value.as_bytes());
                buf.put_u8(LF);
            }
            Reply::NotFound(key) => {
                buf.put_slice(b"key ");
                buf.put_slice(key.as_bytes());
                buf.put_slice(b" not found");
                buf.put_u8(LF);
            }
            Reply::Pairs(pairs) => {
                for (key, value) in pairs {
                    buf.put_slice(key.as_bytes());
                    buf.put_u8(b'=');
                    buf.put_slice(value.as_bytes());
                    buf.put_u8(LF);
                }
            }
            Reply::Error(msg) => {
                buf.put_slice(msg.as_bytes());
                buf.put_u8(LF);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_value() {
        assert_eq!(Reply::Value("1".into()).serialize(), Bytes::from("1\n"));
    }

    #[test]
    fn test_serialize_not_found() {
        assert_eq!(
            Reply::NotFound("missing".into()).serialize(),
            Bytes::from("key missing not found\n")
        );
    }

    #[test]
    fn test_serialize_pairs() {
        let reply = Reply::Pairs(vec![
            ("x".into(), "1".into()),
            ("y".into(), "2".into()),
        ]);
        assert_eq!(reply.serialize(), Bytes::from("x=1\ny=2\n"));
    }

    #[test]
    fn test_silent_replies() {
        assert!(Reply::Silent.is_silent());
        assert!(Reply::Pairs(Vec::new()).is_silent());
        assert!(Reply::Silent.serialize().is_empty());
        assert!(!Reply::Value(String::new()).is_silent());
    }

    #[test]
    fn test_serialize_error() {
        assert_eq!(
            Reply::error("Invalid get command").serialize(),
            Bytes::from("Invalid get command\n")
        );
    }
}
