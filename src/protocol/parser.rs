//! Line Protocol Parser
//!
//! Turns one trimmed text line into a [`Command`].
//!
//! Tokens are separated by exactly one space, so `PUT a  b` has four tokens
//! (one of them empty) and is rejected. Values containing spaces are not
//! representable in this grammar.
//!
//! The parser returns either:
//! - `Ok(command)` - a well-formed command, including `Command::Unknown`
//! - `Err(ParseError::Malformed { .. })` - a known keyword with the wrong
//!   number of arguments

use crate::protocol::types::Command;
use thiserror::Error;

/// Errors that can occur while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A known command was given the wrong number of tokens.
    #[error("Invalid {} command", .command.to_lowercase())]
    Malformed {
        /// Canonical keyword of the attempted command
        command: &'static str,
        /// Number of tokens received, keyword included
        tokens: usize,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one line into a command. The keyword is case-insensitive.
///
/// # Example
///
/// ```
/// use linekv::protocol::{parse_line, Command};
///
/// let cmd = parse_line("put name linekv").unwrap();
/// assert_eq!(cmd, Command::Put { key: "name".into(), value: "linekv".into() });
/// ```
pub fn parse_line(line: &str) -> ParseResult<Command> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let keyword = tokens[0].to_ascii_uppercase();

    let malformed = |command: &'static str| ParseError::Malformed {
        command,
        tokens: tokens.len(),
    };

    match keyword.as_str() {
        "GET" => match tokens.as_slice() {
            [_, key] => Ok(Command::Get {
                key: (*key).to_string(),
            }),
            _ => Err(malformed("GET")),
        },
        "PUT" => match tokens.as_slice() {
            [_, key, value] => Ok(Command::Put {
                key: (*key).to_string(),
                value: (*value).to_string(),
            }),
            _ => Err(malformed("PUT")),
        },
        "DEL" => match tokens.as_slice() {
            [_, key] => Ok(Command::Del {
                key: (*key).to_string(),
            }),
            _ => Err(malformed("DEL")),
        },
        "LIST" => match tokens.as_slice() {
            [_] => Ok(Command::List),
            _ => Err(malformed("LIST")),
        },
        _ => Ok(Command::Unknown(keyword)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        assert_eq!(
            parse_line("GET a").unwrap(),
            Command::Get { key: "a".into() }
        );
    }

    #[test]
    fn test_parse_put() {
        assert_eq!(
            parse_line("PUT a 1").unwrap(),
            Command::Put {
                key: "a".into(),
                value: "1".into()
            }
        );
    }

    #[test]
    fn test_parse_del_and_list() {
        assert_eq!(
            parse_line("DEL a").unwrap(),
            Command::Del { key: "a".into() }
        );
        assert_eq!(parse_line("LIST").unwrap(), Command::List);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert_eq!(parse_line("list").unwrap(), Command::List);
        assert_eq!(
            parse_line("gEt Key").unwrap(),
            Command::Get { key: "Key".into() }
        );
    }

    #[test]
    fn test_arguments_keep_their_case() {
        assert_eq!(
            parse_line("put Name Value").unwrap(),
            Command::Put {
                key: "Name".into(),
                value: "Value".into()
            }
        );
    }

    #[test]
    fn test_put_rejects_multi_word_values() {
        let err = parse_line("PUT a hello world").unwrap_err();
        assert_eq!(
            err,
            ParseError::Malformed {
                command: "PUT",
                tokens: 4
            }
        );
        assert_eq!(err.to_string(), "Invalid put command");
    }

    #[test]
    fn test_wrong_arity() {
        assert!(parse_line("GET").is_err());
        assert!(parse_line("GET a b").is_err());
        assert!(parse_line("PUT a").is_err());
        assert!(parse_line("DEL").is_err());
        assert!(parse_line("LIST extra").is_err());
        assert_eq!(parse_line("DEL").unwrap_err().to_string(), "Invalid del command");
    }

    #[test]
    fn test_double_space_yields_empty_token() {
        // "PUT", "a", "", "1"
        assert!(parse_line("PUT a  1").is_err());
        // "GET", "" is two tokens: an empty key
        assert_eq!(
            parse_line("GET ").unwrap(),
            Command::Get { key: String::new() }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("FOO").unwrap(),
            Command::Unknown("FOO".into())
        );
        assert_eq!(
            parse_line("set a 1").unwrap(),
            Command::Unknown("SET".into())
        );
        assert_eq!(parse_line("").unwrap(), Command::Unknown(String::new()));
    }
}
