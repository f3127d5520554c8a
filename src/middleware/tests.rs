//! Tests for middleware chaining and the bundled middlewares.

#[cfg(test)]
mod middleware_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

        use crate::middleware::{
        chain, cors, enforce_json, middleware_fn, recovery, CorsConfig, Middleware, RecoveryConfig,
    };
    use crate::parser::{HttpRequest, Method};
    use crate::server::{handler_fn, Error, Handler, HandlerFuture, HttpResponse, StatusCode};

    type Journal = Arc<Mutex<Vec<String>>>;

    /// A middleware that records when the request passes it on the way in and out.
    fn tracing_middleware(name: &'static str, journal: Journal) -> Middleware {
        middleware_fn(move |next: Handler| -> Handler {
            let journal = journal.clone();
            Arc::new(move |req: HttpRequest| -> HandlerFuture {
                let next = next.clone();
                let journal = journal.clone();
                Box::pin(async move {
                    journal.lock().unwrap().push(format!("enter {name}"));
                    let response = next(req).await;
                    journal.lock().unwrap().push(format!("exit {name}"));
                    response
                })
            })
        })
    }

    fn recording_handler(journal: Journal) -> Handler {
        handler_fn(move |_req| {
            let journal = journal.clone();
            async move {
                journal.lock().unwrap().push("handler".to_string());
                Ok(HttpResponse::new(StatusCode::Ok))
            }
        })
    }

    fn ok_handler() -> Handler {
        handler_fn(|_req| async { Ok(HttpResponse::new(StatusCode::Ok).with_body_string("ok")) })
    }

    #[tokio::test]
    async fn test_chain_runs_first_middleware_outermost() {
        let journal: Journal = Arc::default();
        let middlewares = vec![
            tracing_middleware("m1", journal.clone()),
            tracing_middleware("m2", journal.clone()),
            tracing_middleware("m3", journal.clone()),
        ];

        let handler = chain(recording_handler(journal.clone()), &middlewares);
        let response = handler(HttpRequest::new(Method::GET, "/")).await.unwrap();

        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["enter m1", "enter m2", "enter m3", "handler", "exit m3", "exit m2", "exit m1"]
        );
    }

    #[tokio::test]
    async fn test_chain_without_middlewares_is_the_handler() {
        let journal: Journal = Arc::default();
        let handler = chain(recording_handler(journal.clone()), &[]);
        handler(HttpRequest::new(Method::GET, "/")).await.unwrap();
        assert_eq!(*journal.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn test_chain_allows_duplicates_and_can_be_reused() {
        let journal: Journal = Arc::default();
        let twice = tracing_middleware("m", journal.clone());
        let middlewares = vec![twice.clone(), twice];

        let handler = chain(recording_handler(journal.clone()), &middlewares);
        handler(HttpRequest::new(Method::GET, "/")).await.unwrap();
        handler(HttpRequest::new(Method::GET, "/")).await.unwrap();

        let entries = journal.lock().unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[..5], ["enter m", "enter m", "handler", "exit m", "exit m"]);
    }

    #[tokio::test]
    async fn test_enforce_json() {
        let handler = chain(ok_handler(), &[enforce_json()]);

        let missing = handler(HttpRequest::new(Method::POST, "/")).await.unwrap();
        assert_eq!(missing.status, StatusCode::BadRequest);
        assert_eq!(missing.body, b"Content-Type header is not set\n");

        let empty = handler(HttpRequest::new(Method::POST, "/").with_header("Content-Type", ""))
            .await
            .unwrap();
        assert_eq!(empty.status, StatusCode::BadRequest);

        let malformed = handler(HttpRequest::new(Method::POST, "/").with_header("Content-Type", "json"))
            .await
            .unwrap();
        assert_eq!(malformed.status, StatusCode::BadRequest);

        let text = handler(HttpRequest::new(Method::POST, "/").with_header("Content-Type", "text/plain"))
            .await
            .unwrap();
        assert_eq!(text.status, StatusCode::UnsupportedMediaType);
        assert_eq!(text.body, b"Content-Type header must be application/json\n");

        let json = handler(
            HttpRequest::new(Method::POST, "/").with_header("content-type", "Application/JSON; charset=utf-8"),
        )
        .await
        .unwrap();
        assert_eq!(json.status, StatusCode::Ok);
        assert_eq!(json.body, b"ok");
    }

    #[test]
    fn test_parse_media_type() {
        use crate::parser::parse_media_type;

        assert_eq!(parse_media_type("application/json").as_deref(), Some("application/json"));
        assert_eq!(parse_media_type(" TEXT/Plain ; charset=utf-8").as_deref(), Some("text/plain"));
        assert_eq!(parse_media_type("application/json;"), Some("application/json".to_string()));
        assert_eq!(parse_media_type("application"), None);
        assert_eq!(parse_media_type("/json"), None);
        assert_eq!(parse_media_type("application/json; charset"), None);
        assert_eq!(parse_media_type("appli cation/json"), None);
    }

    #[tokio::test]
    async fn test_recovery_turns_panic_into_500() {
        let _ = env_logger::builder().is_test(true).try_init();

        let panicking = handler_fn(|req: HttpRequest| async move {
            if req.path == "/panic" {
                panic!("hi");
            }
            Ok(HttpResponse::new(StatusCode::Ok))
        });
        let handler = chain(panicking, &[recovery(RecoveryConfig::default())]);

        let response = handler(HttpRequest::new(Method::GET, "/panic")).await.unwrap();
        assert_eq!(response.status, StatusCode::InternalServerError);
        assert_eq!(response.body, b"Internal Server Error\n");
    }

    #[tokio::test]
    async fn test_recovery_catches_panic_before_the_future_is_built() {
        let panicking: Handler = Arc::new(|_req: HttpRequest| -> HandlerFuture { panic!("eager") });
        let handler = chain(panicking, &[recovery(RecoveryConfig::default())]);

        let response = handler(HttpRequest::new(Method::GET, "/")).await.unwrap();
        assert_eq!(response.status, StatusCode::InternalServerError);
    }

    #[tokio::test]
    async fn test_recovery_passes_results_through() {
        let handler = chain(ok_handler(), &[recovery(RecoveryConfig::default())]);
        let response = handler(HttpRequest::new(Method::GET, "/")).await.unwrap();
        assert_eq!(response.status, StatusCode::Ok);

        let failing = handler_fn(|_req| async { Err(Error::InternalError("boom".to_string())) });
        let handler = chain(failing, &[recovery(RecoveryConfig::default())]);
        let result = handler(HttpRequest::new(Method::GET, "/")).await;
        assert!(matches!(result, Err(Error::InternalError(ref m)) if m == "boom"));
    }

    #[tokio::test]
    async fn test_recovery_aborts_handler_when_request_is_dropped() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let slow = handler_fn(move |_req| {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(HttpResponse::new(StatusCode::Ok))
            }
        });
        let handler = chain(slow, &[recovery(RecoveryConfig::default())]);

        let result = tokio::time::timeout(
            Duration::from_millis(10),
            handler(HttpRequest::new(Method::GET, "/slow")),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    fn preflight(origin: &str, method: &str) -> HttpRequest {
        HttpRequest::new(Method::OPTIONS, "/api/cors")
            .with_header("Origin", origin)
            .with_header("Access-Control-Request-Method", method)
    }

    #[tokio::test]
    async fn test_cors_preflight_with_defaults() {
        let journal: Journal = Arc::default();
        let handler = chain(recording_handler(journal.clone()), &[cors(CorsConfig::default())]);

        let response = handler(preflight("*", "GET")).await.unwrap();
        assert_eq!(response.status, StatusCode::NoContent);
        assert!(response.body.is_empty());
        assert_eq!(response.get_header("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            response.get_header("Access-Control-Allow-Methods").unwrap(),
            "GET, POST, PUT, PATCH, DELETE"
        );
        assert_eq!(
            response.get_header("Access-Control-Allow-Headers").unwrap(),
            "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization, Origin"
        );
        assert_eq!(response.get_header("Vary").unwrap(), "Origin");
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cors_rejected_preflight() {
        let config = CorsConfig::default()
            .with_origins(["https://app.example"])
            .with_methods([Method::GET]);
        let handler = chain(ok_handler(), &[cors(config)]);

        let wrong_origin = handler(preflight("https://evil.example", "GET")).await.unwrap();
        assert_eq!(wrong_origin.status, StatusCode::Ok);
        assert!(wrong_origin.get_header("Access-Control-Allow-Origin").is_none());
        assert!(wrong_origin.body.is_empty());

        let wrong_method = handler(preflight("https://app.example", "DELETE")).await.unwrap();
        assert_eq!(wrong_method.status, StatusCode::Ok);
        assert!(wrong_method.get_header("Access-Control-Allow-Methods").is_none());

        let options = handler(preflight("https://app.example", "OPTIONS")).await.unwrap();
        assert_eq!(options.status, StatusCode::NoContent);
        assert_eq!(options.get_header("Access-Control-Allow-Methods").unwrap(), "GET");
    }

    #[tokio::test]
    async fn test_cors_simple_request() {
        let config = CorsConfig::default()
            .with_origins(["https://app.example"])
            .with_headers(["X-Token"]);
        let handler = chain(ok_handler(), &[cors(config)]);

        let allowed = handler(HttpRequest::new(Method::GET, "/").with_header("Origin", "https://app.example"))
            .await
            .unwrap();
        assert_eq!(allowed.status, StatusCode::Ok);
        assert_eq!(allowed.body, b"ok");
        assert_eq!(allowed.get_header("Access-Control-Allow-Origin").unwrap(), "https://app.example");
        assert_eq!(allowed.get_header("Vary").unwrap(), "Origin");

        let other = handler(HttpRequest::new(Method::GET, "/").with_header("Origin", "https://other.example"))
            .await
            .unwrap();
        assert_eq!(other.body, b"ok");
        assert!(other.get_header("Access-Control-Allow-Origin").is_none());

        // OPTIONS without the preflight headers is an ordinary request
        let plain_options = handler(HttpRequest::new(Method::OPTIONS, "/")).await.unwrap();
        assert_eq!(plain_options.body, b"ok");
    }
}
