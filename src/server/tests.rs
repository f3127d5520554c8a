//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

    use crate::middleware::enforce_json;
    use crate::mux::ServeMux;
    use crate::parser::{Error as ParserError, HttpRequest, Method};
    use crate::router::{bind_routes_to_mux, Action, Route};
    use crate::server::{handler_fn, Error, HttpResponse, HttpServer, ServerConfig, StatusCode};

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: impl Into<Vec<u8>>) -> Self {
            Self {
                read_data: Cursor::new(read_data.into()),
                write_data: Vec::new(),
            }
        }

        fn written(&self) -> String {
            String::from_utf8_lossy(&self.write_data).into_owned()
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.get_mut().write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[derive(Serialize)]
    struct Created {
        id: u32,
    }

    /// `POST /api/items` behind `enforce_json`, plus a failing `/api/broken`.
    fn test_mux() -> ServeMux {
        let create = handler_fn(|_req: HttpRequest| async {
            HttpResponse::new(StatusCode::Created).with_json(&Created { id: 7 })
        });
        let hello = handler_fn(|_req| async {
            Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string("Test response"))
        });
        let broken = handler_fn(|_req| async { Err(Error::InternalError("database offline".to_string())) });

        let routes = Route::new()
            .on("/api/items", Method::POST, Action::new(create, [enforce_json()]))
            .on("/api/hello", Method::GET, hello)
            .any("/api/broken", broken);

        let mut mux = ServeMux::new();
        bind_routes_to_mux(&mut mux, [routes]).unwrap();
        mux
    }

    async fn serve(raw: &str) -> (Result<(), Error>, String) {
        let mux = test_mux();
        let mut stream = MockTcpStream::new(raw);
        let result = HttpServer::handle_connection(&mut stream, &mux, 4096).await;
        (result, stream.written())
    }

    #[tokio::test]
    async fn test_server_creation() {
        let config = ServerConfig {
            addr: "127.0.0.1:9090".parse().unwrap(),
            max_connections: 100,
            read_buffer_size: 4096,
            shutdown_timeout_secs: 5,
        };

        let server = HttpServer::new(config.clone(), test_mux());
        assert_eq!(server.config.addr, config.addr);
        assert_eq!(server.config.max_connections, 100);
        assert_eq!(server.mux.len(), 3);
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let (result, response) = serve("GET /api/hello HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.ends_with("\r\n\r\nTest response"));
    }

    #[tokio::test]
    async fn test_json_endpoint_requires_content_type() {
        let (result, response) = serve("POST /api/items HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Content-Type header is not set"));

        let (result, response) = serve(
            "POST /api/items HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}",
        )
        .await;
        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(response.contains("Content-Type: application/json\r\n"));
        assert!(response.ends_with(r#"{"id":7}"#));
    }

    #[tokio::test]
    async fn test_body_arriving_after_the_head() {
        let mux = test_mux();
        let (mut client, mut server) = tokio::io::duplex(1024);

        let writer = tokio::spawn(async move {
            client
                .write_all(b"POST /api/items HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            client.write_all(b"{}").await.unwrap();
            client
        });

        let result = HttpServer::handle_connection(&mut server, &mux, 4096).await;
        drop(server);

        let mut client = writer.await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(response.ends_with(r#"{"id":7}"#));
    }

    #[tokio::test]
    async fn test_request_larger_than_read_buffer() {
        let body = "x".repeat(100);
        let raw = format!("POST /api/items HTTP/1.0\r\nContent-Length: 100\r\n\r\n{body}");
        let mux = test_mux();
        let mut stream = MockTcpStream::new(raw);

        let result = HttpServer::handle_connection(&mut stream, &mux, 64).await;

        assert!(matches!(
            result,
            Err(Error::ParseError(ParserError::InvalidContentLength(_)))
        ));
        assert!(stream.written().starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let (result, response) = serve("GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Not found: /nonexistent"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_method_not_allowed() {
        let (result, response) = serve("DELETE /api/hello HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(response.contains("Allow: GET, HEAD\r\n"));
        assert!(response.contains("Method DELETE not allowed for path: /api/hello"));
    }

    #[tokio::test]
    async fn test_head_request_has_no_body() {
        let (result, response) = serve("HEAD /api/hello HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_invalid_request() {
        let (result, response) = serve("INVALID /api/hello HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(matches!(result, Err(Error::ParseError(_))));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Invalid HTTP method: INVALID"));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let (result, response) = serve("PATCH /api/broken HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(matches!(result, Err(Error::InternalError(_))));
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("database offline"));
    }

    #[tokio::test]
    async fn test_closed_connection_is_ignored() {
        let (result, response) = serve("").await;
        assert!(result.is_ok());
        assert!(response.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let config = ServerConfig::from_json(r#"{"addr": "0.0.0.0:3000", "max_connections": 8}"#).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.read_buffer_size, ServerConfig::default().read_buffer_size);
        assert_eq!(config.shutdown_timeout().as_secs(), 30);

        let defaults = ServerConfig::from_json("{}").unwrap();
        assert_eq!(defaults.addr.port(), 8080);

        assert!(matches!(
            ServerConfig::from_json(r#"{"max_connections": 0}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(ServerConfig::from_json(r#"{"addr": 12}"#), Err(Error::JsonError(_))));
    }

    #[test]
    fn test_response_serialization() {
        let response = HttpResponse::new(StatusCode::UnsupportedMediaType)
            .with_header("x-trace", "1")
            .with_header("X-Trace", "2");
        assert_eq!(response.get_header("X-TRACE").unwrap(), "2");

        let bytes = String::from_utf8(response.to_bytes()).unwrap();
        assert!(bytes.starts_with("HTTP/1.1 415 Unsupported Media Type\r\n"));
        assert!(bytes.contains("Content-Length: 0\r\n"));
        assert!(bytes.contains("Server: microroute-rs\r\n"));
    }
}
