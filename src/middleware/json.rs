//! Content-Type enforcement for JSON endpoints.

use std::future;
use std::sync::Arc;

use crate::middleware::{middleware_fn, Middleware};
use crate::parser::{parse_media_type, HttpRequest};
use crate::server::{Handler, HandlerFuture, HttpResponse, StatusCode};

/// Only let requests through whose `Content-Type` is `application/json`.
///
/// A missing or unparseable header is answered with `400 Bad Request`, any
/// other media type with `415 Unsupported Media Type`. Media type parameters
/// such as `charset` are accepted.
pub fn enforce_json() -> Middleware {
    middleware_fn(|next: Handler| -> Handler {
        Arc::new(move |req: HttpRequest| -> HandlerFuture {
            match check_json(&req) {
                Ok(()) => next(req),
                Err(response) => Box::pin(future::ready(Ok(response))),
            }
        })
    })
}

fn check_json(req: &HttpRequest) -> Result<(), HttpResponse> {
    let content_type = req
        .get_header("Content-Type")
        .filter(|value| !value.is_empty())
        .ok_or_else(|| HttpResponse::error(StatusCode::BadRequest, "Content-Type header is not set"))?;

    let media_type = parse_media_type(content_type)
        .ok_or_else(|| HttpResponse::error(StatusCode::BadRequest, "Content-Type header is not set"))?;

    if media_type != "application/json" {
        return Err(HttpResponse::error(
            StatusCode::UnsupportedMediaType,
            "Content-Type header must be application/json",
        ));
    }
    Ok(())
}
