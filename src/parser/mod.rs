//! HTTP request parser.
//!
//! Turns the bytes read from a connection into an [`HttpRequest`] that the
//! multiplexer can dispatch.

mod request;
mod method;
mod version;
mod error;
mod media_type;

// Re-export public items
pub use request::{HttpRequest, parse_request, request_len};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
pub(crate) use media_type::parse_media_type;
