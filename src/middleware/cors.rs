//! Cross-origin resource sharing.

use std::future;
use std::sync::Arc;

use crate::middleware::{middleware_fn, Middleware};
use crate::parser::{HttpRequest, Method};
use crate::server::{Handler, HandlerFuture, HttpResponse, StatusCode};

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["*"];

pub const DEFAULT_ALLOWED_METHODS: &[Method] = &[
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

pub const DEFAULT_ALLOWED_HEADERS: &[&str] = &[
    "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization",
    "Origin",
];

/// Allow-lists consulted by the [`cors`] middleware.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<Method>,
    allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            allowed_methods: DEFAULT_ALLOWED_METHODS.to_vec(),
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CorsConfig {
    /// Replace the allowed origins. `"*"` allows any origin.
    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allowed methods. `OPTIONS` is always allowed.
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = methods.into_iter().collect();
        self
    }

    /// Replace the allowed request headers.
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == "*" || o == origin)
    }

    fn allows_method(&self, method: &str) -> bool {
        method == Method::OPTIONS.as_str()
            || self.allowed_methods.iter().any(|m| m.as_str() == method)
    }

    fn joined_methods(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Answer a preflight request without consulting the wrapped handler.
    fn preflight(&self, origin: &str, requested_method: &str) -> HttpResponse {
        if !(self.allows_method(requested_method) && self.allows_origin(origin)) {
            return HttpResponse::new(StatusCode::Ok);
        }
        HttpResponse::new(StatusCode::NoContent)
            .with_header("Access-Control-Allow-Origin", origin)
            .with_header("Access-Control-Allow-Methods", self.joined_methods())
            .with_header("Access-Control-Allow-Headers", self.allowed_headers.join(", "))
    }
}

fn is_preflight(req: &HttpRequest) -> bool {
    req.method == Method::OPTIONS
        && req.get_header("Origin").is_some_and(|v| !v.is_empty())
        && req.get_header("Access-Control-Request-Method").is_some_and(|v| !v.is_empty())
}

fn add_vary_origin(response: &mut HttpResponse) {
    let vary = match response.get_header("Vary") {
        Some(existing) => format!("{existing}, Origin"),
        None => "Origin".to_string(),
    };
    response.set_header("Vary", vary);
}

/// Add CORS headers to responses and answer preflight requests.
///
/// Every response carries `Vary: Origin`. A preflight (`OPTIONS` with both
/// `Origin` and `Access-Control-Request-Method`) never reaches the wrapped
/// handler: an allowed one gets `204 No Content` with the allow-lists, a
/// rejected one an empty `200 OK`. Other requests from an allowed origin get
/// `Access-Control-Allow-Origin` echoing that origin.
pub fn cors(config: CorsConfig) -> Middleware {
    let config = Arc::new(config);
    middleware_fn(move |next: Handler| -> Handler {
        let config = config.clone();
        Arc::new(move |req: HttpRequest| -> HandlerFuture {
            let origin = req.get_header("Origin").cloned().unwrap_or_default();

            if is_preflight(&req) {
                let requested = req
                    .get_header("Access-Control-Request-Method")
                    .cloned()
                    .unwrap_or_default();
                let mut response = config.preflight(&origin, &requested);
                add_vary_origin(&mut response);
                return Box::pin(future::ready(Ok(response)));
            }

            let allow_origin = (!origin.is_empty() && config.allows_origin(&origin)).then_some(origin);
            let next = next.clone();
            Box::pin(async move {
                let mut response = next(req).await?;
                add_vary_origin(&mut response);
                if let Some(origin) = allow_origin {
                    response.set_header("Access-Control-Allow-Origin", origin);
                }
                Ok(response)
            })
        })
    })
}
