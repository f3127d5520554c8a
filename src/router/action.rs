//! A handler together with the middlewares that wrap it.

use std::fmt;

use crate::middleware::{chain, Middleware};
use crate::server::Handler;

/// A terminal handler paired with an ordered list of middlewares.
///
/// An `Action` is never modified: adding middleware produces a new one. The
/// middlewares are kept exactly as given, duplicates included, and are only
/// composed when the route is bound (see [`Action::chained`]).
#[derive(Clone)]
pub struct Action {
    handler: Handler,
    middlewares: Vec<Middleware>,
}

impl Action {
    /// Pair `handler` with `middlewares`; the first middleware runs first.
    pub fn new(handler: Handler, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        Self {
            handler,
            middlewares: middlewares.into_iter().collect(),
        }
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    /// A new action with `extra` appended after the existing middlewares.
    pub fn with_middlewares(&self, extra: &[Middleware]) -> Self {
        let mut middlewares = Vec::with_capacity(self.middlewares.len() + extra.len());
        middlewares.extend_from_slice(&self.middlewares);
        middlewares.extend_from_slice(extra);
        Self::new(self.handler.clone(), middlewares)
    }

    /// The handler with every middleware applied, ready for registration.
    pub fn chained(&self) -> Handler {
        chain(self.handler.clone(), &self.middlewares)
    }
}

impl From<Handler> for Action {
    fn from(handler: Handler) -> Self {
        Self::new(handler, Vec::new())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}
