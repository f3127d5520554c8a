//! Request handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{HttpResponse, Error};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// A terminal request handler: takes the request and produces the response.
///
/// Handlers are shared by every task serving a request, so anything they
/// capture must be `Send + Sync`.
pub type Handler = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure or `async fn` into a [`Handler`].
///
/// ```
/// use microroute::{handler_fn, HttpResponse, StatusCode};
///
/// let hello = handler_fn(|_req| async {
///     Ok(HttpResponse::new(StatusCode::Ok).with_body_string("hello"))
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(move |req: HttpRequest| -> HandlerFuture { Box::pin(f(req)) })
}
