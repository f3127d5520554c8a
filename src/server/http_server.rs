//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::signal;
use log::{info, warn, error};

use crate::mux::ServeMux;
use crate::parser::{parse_request, request_len, Method};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server answering every connection through a [`ServeMux`].
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The bound routes.
    pub mux: Arc<ServeMux>,
}

impl HttpServer {
    /// Create a new HTTP server serving the routes registered on `mux`.
    pub fn new(config: ServerConfig, mux: ServeMux) -> Self {
        Self {
            config,
            mux: Arc::new(mux),
        }
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for pattern in self.mux.patterns() {
            info!("  {pattern}");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Hand a new connection to its own task, or turn it away when the server is full.
    async fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        mux: Arc<ServeMux>,
        read_buffer_size: usize,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::error(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        tasks.spawn(async move {
            // Released when the connection task ends
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &mux, read_buffer_size).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Decide whether an accept error should stop the server.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // Back off before accepting again
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Wait for open connections, up to the configured shutdown timeout.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, timeout: std::time::Duration) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timeout reached, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        self.config.validate()?;
        self.display_server_info();

        let listener = self.setup_listener().await?;
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut tasks = JoinSet::new();

        Self::setup_ctrl_c_handler(shutdown_tx, &mut tasks);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                self.mux.clone(),
                                self.config.read_buffer_size,
                                &mut tasks,
                            ).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks, self.config.shutdown_timeout()).await;

        Ok(())
    }

    /// Read until the head and the `Content-Length` body have arrived.
    ///
    /// Stops early at end of stream or once `limit` bytes are buffered; the
    /// parser then reports what is missing. `None` means the peer closed the
    /// connection without sending anything.
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        limit: usize,
    ) -> Result<Option<Vec<u8>>, Error> {
        let mut buf = Vec::new();
        let mut chunk = vec![0; limit];

        while buf.len() < limit {
            let n = socket.read(&mut chunk[..limit - buf.len()]).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_len(&buf).is_some_and(|len| buf.len() >= len) {
                break;
            }
        }

        if buf.is_empty() {
            return Ok(None);
        }
        if buf.len() >= limit && !matches!(request_len(&buf), Some(len) if len <= buf.len()) {
            warn!("Request exceeds the {limit} byte read buffer");
        }
        Ok(Some(buf))
    }

    /// Read one request from `socket`, dispatch it through `mux` and write the response.
    ///
    /// A request that cannot be parsed is answered with `400 Bad Request` and
    /// a handler error with `500 Internal Server Error`; both are also
    /// returned to the caller for logging.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        mux: &ServeMux,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let buf = match Self::read_request(socket, read_buffer_size).await? {
            Some(buf) => buf,
            None => return Ok(()), // Connection closed
        };

        let request = match parse_request(&buf) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::error(
                    StatusCode::BadRequest,
                    format!("Error parsing request: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        let is_head = request.method == Method::HEAD;
        let mut response = match mux.dispatch(request).await {
            Ok(resp) => resp,
            Err(e) => {
                let response = HttpResponse::error(
                    StatusCode::InternalServerError,
                    format!("Internal server error: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(e);
            }
        };

        // HEAD keeps the headers, including Content-Length, but sends no body
        if is_head {
            response.body.clear();
        }

        socket.write_all(&response.to_bytes()).await?;
        Ok(())
    }
}
