//! HTTP server for microroute-rs.
//!
//! This module provides the handler and response types shared by the whole
//! crate and a small tokio server that answers each connection through a
//! [`ServeMux`](crate::mux::ServeMux).

mod response;
mod config;
mod error;
mod handler;
mod http_server;
mod tests;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{handler_fn, Handler, HandlerFuture};
pub use http_server::HttpServer;
