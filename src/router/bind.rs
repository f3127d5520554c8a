//! Registering route tables with a multiplexer.

use log::debug;

use crate::parser::Method;
use crate::router::{merge_routes, Route};
use crate::server::{Error, Handler};

/// A request multiplexer that route tables can be bound to.
///
/// `pattern` is either `"<METHOD> <path>"` or a bare `"<path>"` matching every
/// method. How paths are matched, and which of two overlapping registrations
/// wins, is up to the implementation.
pub trait Mux {
    fn handle(&mut self, pattern: &str, handler: Handler) -> Result<(), Error>;
}

/// The registration key for one (method, path) entry.
pub fn pattern_for(method: Option<Method>, path: &str) -> String {
    match method {
        Some(method) => format!("{method} {path}"),
        None => path.to_string(),
    }
}

/// Merge `routes` and register every action, with its middlewares applied, on `mux`.
///
/// The first error returned by the multiplexer aborts binding and is passed
/// to the caller; entries registered before it stay registered.
pub fn bind_routes_to_mux<M>(mux: &mut M, routes: impl IntoIterator<Item = Route>) -> Result<(), Error>
where
    M: Mux + ?Sized,
{
    let merged = merge_routes(routes);
    for (path, methods) in merged.iter() {
        for (method, action) in methods {
            let pattern = pattern_for(*method, path);
            debug!("Binding {pattern} ({count} middlewares)", count = action.middlewares().len());
            mux.handle(&pattern, action.chained())?;
        }
    }
    Ok(())
}
