//! Error types for querify operations

use thiserror::Error;

/// Result type alias for querify operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for querify
#[derive(Error, Debug)]
pub enum Error {
    /// Decorator block could not be interpreted
    #[error("Decorator error: {0}")]
    Decorator(String),

    /// Query text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller-supplied arguments failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP error while talking to a SPARQL endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// No usable SPARQL endpoint
    #[error("Endpoint error: {0}")]
    Endpoint(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("missing parameter".to_string());
        assert_eq!(err.to_string(), "Validation error: missing parameter");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
