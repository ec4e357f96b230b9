//! HTTP/1 transport for a sealed engine.
//!
//! Each accepted connection is served by hyper on its own Tokio task. For
//! every request the body is collected (bounded by size and time), the
//! request is handed to [`SealedEngine::dispatch`] on the blocking pool, and
//! the buffered response is written back.
//!
//! A panic that escapes the handler chain only fails its own request: the
//! blocking task reports it as a join error, which becomes a 500.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_core::Engine;
//! use trellis_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new();
//!     engine.get("/", |ctx| ctx.string(http::StatusCode::OK, "hi"))?;
//!
//!     let server = Server::new(ServerConfig::default(), Arc::new(engine.seal()));
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use trellis_core::{BufferedResponse, SealedEngine};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response body type.
pub type ResponseBody = Full<Bytes>;

/// Response type written back to clients.
pub type HttpResponse = Response<ResponseBody>;

/// Serves a [`SealedEngine`] over HTTP/1.1.
pub struct Server {
    config: ServerConfig,
    engine: Arc<SealedEngine>,
}

impl Server {
    /// Creates a server for `engine`.
    #[must_use]
    pub fn new(config: ServerConfig, engine: Arc<SealedEngine>) -> Self {
        Self { config, engine }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the engine being served.
    #[must_use]
    pub fn engine(&self) -> &Arc<SealedEngine> {
        &self.engine
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> ServerResult<()> {
        let shutdown = ShutdownSignal::from_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let configured = self.config.http_addr();
        let addr = match self.config.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                return Err(ServerError::BindError(format!(
                    "'{configured}' is not a socket address ({e})"
                )))
            }
        };

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => return Err(ServerError::BindError(format!("cannot listen on {addr}: {e}"))),
        };

        self.serve(listener, shutdown).await
    }

    /// Accepts connections on an already bound listener until `shutdown`
    /// fires, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let bound = listener.local_addr()?;
        tracing::info!(addr = %bound, routes = self.engine.router().len(), "trellis listening");

        let this = Arc::new(self);
        let open = ConnectionTracker::new();

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                () = shutdown.recv() => break,
            };
            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    continue;
                }
            };

            let token = open.track();
            let conn_server = Arc::clone(&this);
            let conn_shutdown = shutdown.clone();
            tokio::spawn(async move {
                let _token = token;
                if let Err(e) = conn_server.handle_connection(stream, peer, conn_shutdown).await {
                    tracing::debug!(%peer, error = %e, "connection ended with error");
                }
            });
        }

        let grace = this.config.shutdown_timeout();
        tracing::info!(open = open.count(), ?grace, "no longer accepting, draining");

        if tokio::time::timeout(grace, open.drained()).await.is_err() {
            tracing::warn!(open = open.count(), "grace period over, abandoning connections");
        }

        tracing::info!(addr = %bound, "trellis stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let service = service_fn(move |request: Request<Incoming>| {
            let this = Arc::clone(&self);
            async move { this.handle_request(request).await }
        });
        let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);

        tokio::select! {
            served = connection => served,
            () = shutdown.recv() => {
                tracing::debug!(peer = %remote_addr, "dropping connection for shutdown");
                Ok(())
            }
        }
    }

    async fn handle_request(&self, request: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        let (head, incoming) = request.into_parts();
        let limit = self.config.max_body_bytes();
        let reading = Limited::new(incoming, limit).collect();

        let response = match tokio::time::timeout(self.config.request_timeout(), reading).await {
            Ok(Ok(collected)) => {
                self.dispatch(Request::from_parts(head, collected.to_bytes()))
                    .await
            }
            Ok(Err(e)) if e.is::<LengthLimitError>() => {
                tracing::warn!(path = head.uri.path(), limit, "body over limit");
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body exceeds limit")
            }
            Ok(Err(e)) => {
                tracing::warn!(path = head.uri.path(), error = %e, "body read failed");
                error_response(StatusCode::BAD_REQUEST, &format!("unreadable request body: {e}"))
            }
            Err(_) => {
                tracing::warn!(path = head.uri.path(), "body not received in time");
                error_response(StatusCode::REQUEST_TIMEOUT, "request body not received in time")
            }
        };
        Ok(response)
    }

    /// Runs the engine for one fully read request.
    pub async fn dispatch(&self, request: Request<Bytes>) -> HttpResponse {
        let label = format!("{} {}", request.method(), request.uri().path());
        let engine = Arc::clone(&self.engine);

        let chain = tokio::task::spawn_blocking(move || {
            let mut out = BufferedResponse::new();
            engine.dispatch(&request, &mut out);
            out.into_response()
        });

        match tokio::time::timeout(self.config.request_timeout(), chain).await {
            Ok(Ok(response)) => response,
            Ok(Err(join)) => {
                if join.is_panic() {
                    tracing::error!(request = %label, "unrecovered panic in handler chain");
                } else {
                    tracing::error!(request = %label, error = %join, "handler chain task lost");
                }
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            Err(_) => {
                tracing::warn!(request = %label, "handler chain over request timeout");
                error_response(StatusCode::GATEWAY_TIMEOUT, "handler did not finish in time")
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("http_addr", &self.config.http_addr())
            .field("routes", &self.engine.router().len())
            .finish_non_exhaustive()
    }
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "message": message });
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
