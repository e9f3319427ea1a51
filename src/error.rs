//! Error types for kernel network table parsing

use std::io;
use thiserror::Error;

/// Result type alias for procnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a table
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed table content: missing field, bad hex, wrong address
    /// length, missing separator, or a protocol absent from a summary table
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Whether this error reports malformed content rather than an I/O or
    /// configuration problem
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_kind() {
        assert!(Error::parse("bad hex").is_parse_failure());
        let io = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_parse_failure());
        assert_eq!(io.to_string(), "I/O error: gone");
    }
}
