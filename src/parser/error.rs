//! Error types for the HTTP request parser.

use thiserror::Error;

/// Errors that can occur while turning raw bytes into an [`HttpRequest`](crate::parser::HttpRequest).
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP method in the request is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request target does not start with `/`.
    #[error("Invalid request target: {0}")]
    InvalidPath(String),

    /// The request line does not have exactly three parts.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header line has no `:` separator or an empty name.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    /// `Content-Length` is not a number or exceeds the bytes received.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,

    /// The request body is not valid JSON for the requested type.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
