//! Declarative route tables and middleware chaining for a minimal HTTP multiplexer.
//!
//! Routes are described as data and registered in one step:
//!
//! - a [`Route`] maps a path to methods to an [`Action`], a handler plus the
//!   middlewares that wrap it;
//! - [`new_group_route`] and [`new_group`] mount tables under path prefixes
//!   and attach group-wide middleware;
//! - [`merge_routes`] combines tables, the later one winning per path;
//! - [`bind_routes_to_mux`] composes every action's middlewares with
//!   [`chain`] and registers the result on a [`Mux`] such as [`ServeMux`].
//!
//! Middlewares run in the order they are listed: for `[m1, m2, m3]` the
//! request passes through `m1` first and the response leaves through `m1`
//! last. The crate ships three of them: [`recovery`], [`enforce_json`] and
//! [`cors`].
//!
//! # Examples
//!
//! ## Building route groups
//!
//! ```
//! use microroute::{
//!     bind_routes_to_mux, enforce_json, handler_fn, new_group, recovery, GroupRoute, HttpResponse,
//!     Method, RecoveryConfig, Route, ServeMux, StatusCode,
//! };
//!
//! let list = handler_fn(|_req| async { Ok(HttpResponse::new(StatusCode::Ok).with_body_string("[]")) });
//! let create = handler_fn(|_req| async { Ok(HttpResponse::new(StatusCode::Created)) });
//!
//! let mut group = GroupRoute::new();
//! group.insert(
//!     "/api/v1".to_string(),
//!     Route::new()
//!         .on("/books", Method::GET, list)
//!         .on("/books", Method::POST, create),
//! );
//! let routes = new_group(group, &[recovery(RecoveryConfig::default()), enforce_json()]);
//!
//! let mut mux = ServeMux::new();
//! bind_routes_to_mux(&mut mux, [routes]).unwrap();
//! assert_eq!(mux.patterns().collect::<Vec<_>>(), ["GET /api/v1/books", "POST /api/v1/books"]);
//! ```
//!
//! ## Dispatching a request
//!
//! ```
//! use microroute::{bind_routes_to_mux, handler_fn, HttpRequest, HttpResponse, Method, Route, ServeMux, StatusCode};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let show = handler_fn(|req: HttpRequest| async move {
//!     let id = req.param("id").unwrap_or_default().to_string();
//!     Ok(HttpResponse::new(StatusCode::Ok).with_body_string(id))
//! });
//!
//! let mut mux = ServeMux::new();
//! bind_routes_to_mux(&mut mux, [Route::new().on("/books/{id}", Method::GET, show)]).unwrap();
//!
//! let response = mux.dispatch(HttpRequest::new(Method::GET, "/books/42")).await.unwrap();
//! assert_eq!(response.body, b"42");
//!
//! let response = mux.dispatch(HttpRequest::new(Method::DELETE, "/books/42")).await.unwrap();
//! assert_eq!(response.status, StatusCode::MethodNotAllowed);
//! # }
//! ```
//!
//! ## Parsing requests
//!
//! ```
//! use microroute::{parse_request, ParserError};
//!
//! let request = parse_request(b"GET /index.html?lang=en HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
//! assert_eq!(request.path, "/index.html");
//! assert_eq!(request.get_query_param("lang").map(String::as_str), Some("en"));
//!
//! match parse_request(b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n") {
//!     Err(ParserError::InvalidMethod(method)) => println!("Invalid method: {method}"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! See `demos/route_groups.rs` for a complete server.

pub mod middleware;
pub mod mux;
pub mod parser;
pub mod router;
pub mod server;

// Re-export commonly used items for convenience
pub use middleware::{chain, cors, enforce_json, middleware_fn, recovery, CorsConfig, Middleware, RecoveryConfig};
pub use mux::ServeMux;
pub use parser::{parse_request, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use router::{
    bind_routes_to_mux, merge_routes, new_group, new_group_route, pattern_for, Action, GroupRoute, MethodRoutes, Mux,
    Route,
};
pub use server::{
    handler_fn, Error as ServerError, Handler, HandlerFuture, HttpResponse, HttpServer, ServerConfig, StatusCode,
};
