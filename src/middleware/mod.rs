//! Middleware: wrappers composed around a [`Handler`].
//!
//! A middleware receives the next handler in the chain and returns a new
//! handler that may run code before and after it, or answer the request
//! itself without calling it. [`chain`] composes a list of middlewares so
//! that the first one in the list is the outermost wrapper:
//!
//! ```text
//! chain(h, [m1, m2, m3])  ==  m1(m2(m3(h)))
//!
//! request  -> m1 -> m2 -> m3 -> h
//! response <- m1 <- m2 <- m3 <- h
//! ```
//!
//! A middleware must not keep per-request mutable state in what it captures:
//! the handler it returns is invoked concurrently for unrelated requests.
//! Configuration such as a logging target is passed into the constructor and
//! only read afterwards.

mod cors;
mod json;
mod recovery;
mod tests;

use std::sync::Arc;

use crate::server::Handler;

pub use cors::{cors, CorsConfig, DEFAULT_ALLOWED_HEADERS, DEFAULT_ALLOWED_METHODS, DEFAULT_ALLOWED_ORIGINS};
pub use json::enforce_json;
pub use recovery::{recovery, RecoveryConfig};

/// A function from handler to handler.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Wrap a closure into a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Apply `middlewares` around `handler`, first element outermost.
///
/// The slice is walked from the back so that the last middleware wraps the
/// handler directly and the first one ends up receiving the request first.
pub fn chain(handler: Handler, middlewares: &[Middleware]) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware(next))
}
