//! Error types for the HTTP server, the multiplexer and route binding.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur while registering routes or serving requests.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A registration pattern the multiplexer cannot understand.
    #[error("Invalid pattern {0:?}: {1}")]
    InvalidPattern(String, String),

    /// A (method, path) pair registered twice on the same multiplexer.
    #[error("Pattern {0:?} conflicts with an existing registration")]
    DuplicatePattern(String),

    /// Invalid server configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
