//! A book catalogue served from route groups with layered middleware.
//!
//! Run with `RUST_LOG=debug cargo run --example route_groups` and try:
//!
//! ```text
//! curl -i localhost:8080/api/v1/books
//! curl -i -X POST -H 'Content-Type: application/json' -d '{"title":"Dune"}' localhost:8080/api/v1/books
//! curl -i -X POST localhost:8080/api/v1/books          # 400, no Content-Type
//! curl -i localhost:8080/api/v1/books/7
//! curl -i localhost:8080/api/v1/panic                  # 500, recovered
//! curl -i -X OPTIONS -H 'Origin: https://example.com' localhost:8080/public/ping
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use microroute::{
    bind_routes_to_mux, cors, enforce_json, handler_fn, new_group, recovery, Action, CorsConfig, GroupRoute,
    HttpRequest, HttpResponse, HttpServer, Method, RecoveryConfig, Route, ServeMux, ServerConfig, ServerError,
    StatusCode,
};

#[derive(Deserialize)]
struct NewBook {
    title: String,
}

#[derive(Serialize)]
struct Book {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let next_id = Arc::new(AtomicU32::new(1));

    let list = handler_fn(|_req| async {
        let books = vec![Book { id: 0, title: "The Rust Programming Language".to_string() }];
        HttpResponse::new(StatusCode::Ok).with_json(&books)
    });

    let create = handler_fn(move |req: HttpRequest| {
        let next_id = next_id.clone();
        async move {
            let new_book: NewBook = match req.json() {
                Ok(book) => book,
                Err(e) => return Ok(HttpResponse::error(StatusCode::BadRequest, format!("Invalid book: {e}"))),
            };
            let book = Book {
                id: next_id.fetch_add(1, Ordering::Relaxed),
                title: new_book.title,
            };
            HttpResponse::new(StatusCode::Created).with_json(&book)
        }
    });

    let show = handler_fn(|req: HttpRequest| async move {
        let id = req.param("id").unwrap_or_default();
        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string(format!("Book {id}")))
    });

    let panicking = handler_fn(|req: HttpRequest| async move {
        if req.path.ends_with("/panic") {
            panic!("the shelf collapsed");
        }
        Ok::<_, ServerError>(HttpResponse::new(StatusCode::Ok))
    });

    let ping = handler_fn(|_req| async {
        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string("pong"))
    });

    // Only the write endpoint checks the body type; the whole group is recovered.
    let mut api = GroupRoute::new();
    api.insert(
        "/api/v1".to_string(),
        Route::new()
            .on("/books", Method::GET, list)
            .on("/books", Method::POST, Action::new(create, [enforce_json()]))
            .on("/books/{id}", Method::GET, show)
            .any("/panic", panicking),
    );
    let api = new_group(api, &[recovery(RecoveryConfig::default())]);

    let mut public = GroupRoute::new();
    public.insert("/public".to_string(), Route::new().any("/ping", ping));
    let public = new_group(
        public,
        &[cors(CorsConfig::default().with_origins(["https://example.com"]))],
    );

    let mut mux = ServeMux::new();
    bind_routes_to_mux(&mut mux, [api, public])?;
    info!("Bound {count} routes", count = mux.len());

    let server = HttpServer::new(ServerConfig::default(), mux);
    server.start().await?;

    Ok(())
}
