//! Route tables, prefix groups and merging.

use std::collections::BTreeMap;
use std::fmt;

use crate::middleware::Middleware;
use crate::parser::Method;
use crate::router::Action;

/// The actions registered on one path, keyed by method.
///
/// `None` is the wildcard: it answers every method that has no entry of its own.
pub type MethodRoutes = BTreeMap<Option<Method>, Action>;

/// Route tables keyed by the path prefix they are mounted under.
pub type GroupRoute = BTreeMap<String, Route>;

/// A declarative routing table: path, then method, then [`Action`].
///
/// Paths are opaque strings handed to the multiplexer unchanged; only
/// [`new_group_route`] touches them, by prepending a prefix. A table owns its
/// entries, so operations that add middleware consume the table and return
/// the updated one; a clone taken beforehand keeps its own view.
#[derive(Clone, Default)]
pub struct Route {
    paths: BTreeMap<String, MethodRoutes>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `method` on `path`, replacing any previous one.
    pub fn on(mut self, path: impl Into<String>, method: Method, action: impl Into<Action>) -> Self {
        self.paths
            .entry(path.into())
            .or_default()
            .insert(Some(method), action.into());
        self
    }

    /// Register `action` for every method on `path` without an entry of its own.
    pub fn any(mut self, path: impl Into<String>, action: impl Into<Action>) -> Self {
        self.paths
            .entry(path.into())
            .or_default()
            .insert(None, action.into());
        self
    }

    /// Replace the whole method map of `path`.
    pub fn insert(&mut self, path: impl Into<String>, methods: MethodRoutes) -> Option<MethodRoutes> {
        self.paths.insert(path.into(), methods)
    }

    pub fn get(&self, path: &str) -> Option<&MethodRoutes> {
        self.paths.get(path)
    }

    /// Look up the action for an exact (path, method) key.
    pub fn action(&self, path: &str, method: Option<Method>) -> Option<&Action> {
        self.paths.get(path)?.get(&method)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodRoutes)> {
        self.paths.iter().map(|(path, methods)| (path.as_str(), methods))
    }

    /// Append `middlewares` after the existing ones on every action.
    ///
    /// Each action is replaced by a new one; handler-level middlewares keep
    /// running before the ones added here.
    pub fn set_middleware(mut self, middlewares: &[Middleware]) -> Self {
        if middlewares.is_empty() {
            return self;
        }
        for methods in self.paths.values_mut() {
            for action in methods.values_mut() {
                *action = action.with_middlewares(middlewares);
            }
        }
        self
    }
}

impl IntoIterator for Route {
    type Item = (String, MethodRoutes);
    type IntoIter = std::collections::btree_map::IntoIter<String, MethodRoutes>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl FromIterator<(String, MethodRoutes)> for Route {
    fn from_iter<I: IntoIterator<Item = (String, MethodRoutes)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, MethodRoutes)> for Route {
    fn extend<I: IntoIterator<Item = (String, MethodRoutes)>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.paths.iter().map(|(path, methods)| {
                let methods: Vec<&str> = methods
                    .keys()
                    .map(|m| m.as_ref().map_or("*", Method::as_str))
                    .collect();
                (path, methods)
            }))
            .finish()
    }
}

/// Mount `routes` under `prefix`.
///
/// Every path becomes `prefix + path`, keeping its method map as is. When
/// two tables produce the same prefixed path, the later table's method map
/// replaces the earlier one entirely; the methods are not combined.
pub fn new_group_route(prefix: &str, routes: impl IntoIterator<Item = Route>) -> Route {
    routes
        .into_iter()
        .flatten()
        .map(|(path, methods)| (format!("{prefix}{path}"), methods))
        .collect()
}

/// Flatten a [`GroupRoute`] and append `middlewares` to every action in it.
///
/// Prefixes are visited in ascending order. Group middlewares run after the
/// middlewares each action was declared with.
pub fn new_group(group: GroupRoute, middlewares: &[Middleware]) -> Route {
    group
        .into_iter()
        .flat_map(|(prefix, route)| new_group_route(&prefix, [route]))
        .collect::<Route>()
        .set_middleware(middlewares)
}

/// Combine several tables into a new one.
///
/// A path defined by more than one table takes the method map of the last
/// table that defines it, in full.
// TODO: offer a per-method merge once callers need to split one path's methods across tables.
pub fn merge_routes(routes: impl IntoIterator<Item = Route>) -> Route {
    let mut merged = Route::new();
    for route in routes {
        merged.extend(route);
    }
    merged
}
