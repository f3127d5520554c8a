//! Declarative route tables.
//!
//! Routes are declared as data: a [`Route`] maps paths to methods to
//! [`Action`]s. Tables can be mounted under a prefix ([`new_group_route`],
//! [`new_group`]), given extra middleware ([`Route::set_middleware`]),
//! combined ([`merge_routes`]) and finally registered with a [`Mux`]
//! ([`bind_routes_to_mux`]).
//!
//! Collisions are resolved per path, not per method: when two tables define
//! the same path, the later table's whole method map wins.

mod action;
mod bind;
mod route;

pub use action::Action;
pub use bind::{bind_routes_to_mux, pattern_for, Mux};
pub use route::{merge_routes, new_group, new_group_route, GroupRoute, MethodRoutes, Route};
