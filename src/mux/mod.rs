//! A method- and path-aware request multiplexer.
//!
//! [`ServeMux`] is the dispatch table the route binder registers into. A
//! pattern is `"<METHOD> <path>"` or just `"<path>"` for every method. Paths
//! are made of `/`-separated segments:
//!
//! - a literal segment matches itself;
//! - `{name}` matches one non-empty segment and captures it as `name`;
//! - `{name...}`, only as the last segment, matches the rest of the path;
//! - a trailing `/` makes the pattern match everything below it, and `/`
//!   alone matches every path.
//!
//! When several patterns match a request, the one with the most specific
//! path wins; for equally specific paths a registration for the request
//! method beats a `GET` registration answering `HEAD`, which beats a
//! registration for every method.

mod pattern;

use std::fmt;

use log::debug;

use crate::parser::{HttpRequest, Method};
use crate::router::Mux;
use crate::server::{Error, Handler, HttpResponse, StatusCode};

use pattern::Pattern;

struct Entry {
    pattern: Pattern,
    handler: Handler,
}

impl Entry {
    /// How well the registered method fits `method`; `None` if it does not.
    fn method_rank(&self, method: Method) -> Option<u8> {
        match self.pattern.method {
            Some(m) if m == method => Some(2),
            Some(Method::GET) if method == Method::HEAD => Some(1),
            Some(_) => None,
            None => Some(0),
        }
    }
}

/// Registered handlers, matched against incoming requests by path and method.
///
/// Registration happens through [`Mux::handle`], normally via
/// [`bind_routes_to_mux`](crate::router::bind_routes_to_mux). Once built the
/// mux is only read, so the server shares it behind an `Arc`.
#[derive(Default)]
pub struct ServeMux {
    entries: Vec<Entry>,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered patterns, in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.raw.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Route `req` to the best matching handler and run it.
    ///
    /// Answers `404 Not Found` when no pattern matches the path and
    /// `405 Method Not Allowed`, with an `Allow` header, when patterns match
    /// the path but none accepts the method. Errors come only from the
    /// handler itself.
    pub async fn dispatch(&self, mut req: HttpRequest) -> Result<HttpResponse, Error> {
        let matching: Vec<_> = self
            .entries
            .iter()
            .filter_map(|entry| entry.pattern.matches(&req.path).map(|params| (entry, params)))
            .collect();

        if matching.is_empty() {
            debug!("No pattern matches {path}", path = req.path);
            return Ok(HttpResponse::error(
                StatusCode::NotFound,
                format!("Not found: {path}", path = req.path),
            ));
        }

        let best = matching
            .iter()
            .filter_map(|(entry, params)| {
                let rank = entry.method_rank(req.method)?;
                Some(((entry.pattern.specificity(), rank), *entry, params))
            })
            .max_by(|a, b| a.0.cmp(&b.0));

        match best {
            Some((_, entry, params)) => {
                debug!("{method} {path} -> {pattern}", method = req.method, path = req.path, pattern = entry.pattern.raw);
                req.params = params.clone();
                (entry.handler)(req).await
            }
            None => {
                let allowed = allowed_methods(matching.iter().map(|(entry, _)| *entry));
                Ok(HttpResponse::error(
                    StatusCode::MethodNotAllowed,
                    format!(
                        "Method {method} not allowed for path: {path}. Allowed methods: {allowed}",
                        method = req.method,
                        path = req.path,
                    ),
                )
                .with_header("Allow", allowed))
            }
        }
    }
}

/// Sorted, comma-separated methods of `entries`; `GET` implies `HEAD`.
fn allowed_methods<'a>(entries: impl Iterator<Item = &'a Entry>) -> String {
    let mut methods: Vec<Method> = entries.filter_map(|entry| entry.pattern.method).collect();
    if methods.contains(&Method::GET) {
        methods.push(Method::HEAD);
    }
    methods.sort();
    methods.dedup();
    methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ")
}

impl Mux for ServeMux {
    /// Register `handler` under `pattern`.
    ///
    /// Fails with [`Error::InvalidPattern`] for a malformed pattern and with
    /// [`Error::DuplicatePattern`] when a pattern with the same method and
    /// the same shape is already registered. A pattern for every method and
    /// one for a specific method may share a path.
    fn handle(&mut self, pattern: &str, handler: Handler) -> Result<(), Error> {
        let pattern = Pattern::parse(pattern)?;
        if let Some(existing) = self.entries.iter().find(|entry| entry.pattern.conflicts_with(&pattern)) {
            return Err(Error::DuplicatePattern(format!(
                "{new} (registered as {old})",
                new = pattern.raw,
                old = existing.pattern.raw
            )));
        }
        self.entries.push(Entry { pattern, handler });
        Ok(())
    }
}

impl fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeMux")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .finish()
    }
}
