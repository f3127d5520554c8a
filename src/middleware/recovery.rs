//! Panic containment.

use std::any::Any;
use std::sync::Arc;

use log::Level;
use tokio::task::JoinHandle;

use crate::middleware::{middleware_fn, Middleware};
use crate::parser::HttpRequest;
use crate::server::{Error, Handler, HandlerFuture, HttpResponse, StatusCode};

/// Where and how loudly [`recovery`] reports a panic.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// `log` target the panic message is written to.
    pub target: String,
    /// Level of the log record.
    pub level: Level,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            target: "microroute::recovery".to_string(),
            level: Level::Error,
        }
    }
}

/// Turn a panic in the wrapped handler into a `500 Internal Server Error`.
///
/// The inner handler runs on its own tokio task so a panic unwinds that task
/// only; the join error is logged and converted into a response. Errors the
/// handler returns normally pass through untouched. Dropping the returned
/// future, e.g. when the connection task is aborted, aborts the inner task.
pub fn recovery(config: RecoveryConfig) -> Middleware {
    let config = Arc::new(config);
    middleware_fn(move |next: Handler| -> Handler {
        let config = config.clone();
        Arc::new(move |req: HttpRequest| -> HandlerFuture {
            let next = next.clone();
            let config = config.clone();
            Box::pin(async move {
                let method = req.method;
                let path = req.path.clone();
                let mut task = AbortOnDrop(tokio::spawn(async move { next(req).await }));
                match (&mut task.0).await {
                    Ok(result) => result,
                    Err(err) if err.is_panic() => {
                        let payload = err.into_panic();
                        log::log!(
                            target: config.target.as_str(),
                            config.level,
                            "panic recovered: {message} ({method} {path})",
                            message = panic_message(payload.as_ref())
                        );
                        Ok(HttpResponse::error(
                            StatusCode::InternalServerError,
                            StatusCode::InternalServerError.reason_phrase(),
                        ))
                    }
                    Err(err) => Err(Error::InternalError(err.to_string())),
                }
            })
        })
    })
}

/// Aborts the spawned handler task if the request future is dropped first.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
