//! # HTTP Server
//!
//! HTTP/1.1 server built on Hyper and Tokio.
//!
//! ## Key Features
//!
//! - One task per connection on the Tokio runtime
//! - Graceful shutdown on Ctrl-C or an external cancellation token
//! - Request body size limit
//! - Zero-network `test_request` path through the same pipeline

use crate::error::{Error, Result};
use crate::middleware::{Middleware, MiddlewareChain, MiddlewareResult};
use crate::openapi::{swagger_ui_html, ApiDoc, RouteDoc};
use crate::router::{Method, Router};
use http_body_util::Full;
pub use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use crate::request::Request;

/// HTTP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Enable keep-alive connections
    pub keep_alive: bool,
    /// Shutdown timeout for graceful shutdown (default: 30 seconds)
    pub shutdown_timeout: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([0, 0, 0, 0], 3000).into(),
            keep_alive: true,
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

/// HTTP response produced by handlers and middleware
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Content type
    pub content_type: String,
    /// Response headers
    pub headers: HashMap<String, String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
            content_type: "application/json".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl Response {
    /// Create a JSON response from an already serialized body
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Serialize `value` into a JSON response with the given status
    ///
    /// Serialization failures become a 500 with a generic body.
    #[must_use]
    pub fn json_value<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::json(body).with_status(status),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                Self::json(r#"{"error": "Internal Server Error"}"#).with_status(500)
            }
        }
    }

    /// Create a text response
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: "text/plain".to_string(),
            ..Self::default()
        }
    }

    /// Create an HTML response
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: "text/html; charset=utf-8".to_string(),
            ..Self::default()
        }
    }

    /// Create a body-less response
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::text("").with_status(status)
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set or override a header
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.content_type = value.to_string();
        } else {
            self.headers.insert(key.to_string(), value.to_string());
        }
    }

    /// Parse the body back into JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the body is not valid JSON
    pub fn body_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Convert to hyper Response
    fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(CONTENT_TYPE, value);
        }
        for (k, v) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(name, value);
            }
        }
        response
    }
}

/// Boxed future returned by handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Handler function type (async)
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// HTTP server
pub struct Server {
    config: ServerConfig,
    router: Router,
    handlers: Vec<Handler>,
    middleware: MiddlewareChain,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Create a new Server instance
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a server with explicit configuration
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            handlers: Vec::new(),
            middleware: MiddlewareChain::new(),
        }
    }

    /// Bind the server to an address
    #[must_use]
    pub const fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.address = addr;
        self
    }

    /// Set max request body size
    pub fn set_max_body_size(&mut self, bytes: usize) {
        self.config.max_body_size = bytes;
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Add a middleware to the chain
    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.add(middleware);
    }

    /// Add a route, its handler and its documentation annotation
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the route cannot be registered
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        doc: Option<RouteDoc>,
    ) -> Result<()> {
        self.router.add_route(method, path, doc)?;
        self.handlers.push(handler);
        Ok(())
    }

    /// Serve the OpenAPI document and Swagger UI under `base`
    ///
    /// The document covers the routes registered so far, so call this last.
    /// `base` serves the UI, `{base}/openapi.json` the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or the paths
    /// are already taken
    pub fn mount_docs(&mut self, api_doc: &ApiDoc, base: &str, title: &str) -> Result<()> {
        let spec_path = format!("{}/openapi.json", base.trim_end_matches('/'));
        let document = Arc::new(crate::json::to_json_pretty(
            &api_doc.document(self.router.routes()),
        )?);
        let page = Arc::new(swagger_ui_html(title, &spec_path));

        self.add_route(
            Method::Get,
            base,
            handler(move |_req| {
                let page = page.clone();
                async move { Response::html(page.as_str()) }
            }),
            None,
        )?;
        self.add_route(
            Method::Get,
            &spec_path,
            handler(move |_req| {
                let document = document.clone();
                async move { Response::json(document.as_str()) }
            }),
            None,
        )
    }

    /// Start the server and stop on Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the listener cannot be set up
    pub async fn serve(&self) -> Result<()> {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            trigger.cancel();
        });
        self.serve_with_shutdown(token).await
    }

    /// Start the server and stop once `shutdown` is cancelled
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the listener cannot be set up
    pub async fn serve_with_shutdown(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.config.address;
        let listener = bind_listener(addr).map_err(|source| Error::BindError {
            address: addr.to_string(),
            source,
        })?;

        info!("Server listening on http://{}", addr);
        self.serve_on(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until `shutdown`
    ///
    /// On cancellation every open connection finishes its in-flight request
    /// and closes; idle keep-alive connections close at once. Connections
    /// still open after `shutdown_timeout` are abandoned.
    ///
    /// # Errors
    ///
    /// Currently infallible; accept failures are logged and skipped
    pub async fn serve_on(
        &self,
        listener: tokio::net::TcpListener,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let router = Arc::new(self.router.clone());
        let handlers = Arc::new(self.handlers.clone());
        let middleware = Arc::new(self.middleware.clone());
        let active = Arc::new(AtomicUsize::new(0));
        let max_body_size = self.config.max_body_size;
        let keep_alive = self.config.keep_alive;

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, remote_addr) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let router = router.clone();
                    let handlers = handlers.clone();
                    let middleware = middleware.clone();
                    let active = active.clone();
                    let shutdown = shutdown.clone();

                    active.fetch_add(1, Ordering::Relaxed);
                    tokio::task::spawn(async move {
                        let conn = http1::Builder::new()
                            .keep_alive(keep_alive)
                            .serve_connection(io, service_fn(move |req| {
                                let router = router.clone();
                                let handlers = handlers.clone();
                                let middleware = middleware.clone();
                                async move {
                                    let method = req.method().clone();
                                    let path = req.uri().path().to_string();
                                    let version = format!("{:?}", req.version());

                                    let resp = handle_request(
                                        req,
                                        &router,
                                        &handlers,
                                        &middleware,
                                        max_body_size,
                                    ).await;

                                    info!("    {} - \"{} {} {}\" {}",
                                        remote_addr,
                                        method,
                                        path,
                                        version,
                                        resp.status()
                                    );
                                    Ok::<_, hyper::Error>(resp)
                                }
                            }));
                        tokio::pin!(conn);

                        let mut draining = false;
                        let result = loop {
                            tokio::select! {
                                res = conn.as_mut() => break res,
                                () = shutdown.cancelled(), if !draining => {
                                    draining = true;
                                    conn.as_mut().graceful_shutdown();
                                }
                            }
                        };
                        if let Err(err) = result {
                            error!("Error serving connection: {:?}", err);
                        }
                        active.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                () = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        let drain = async {
            while active.load(Ordering::Relaxed) > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        if tokio::time::timeout(self.config.shutdown_timeout, drain)
            .await
            .is_err()
        {
            warn!(
                remaining = active.load(Ordering::Relaxed),
                "Shutdown timeout reached with connections still open"
            );
        }
        Ok(())
    }

    /// Execute a test request directly without network stack
    pub async fn test_request(
        &self,
        method: Method,
        path: &str,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Response {
        if let Some(b) = body.as_ref() {
            if b.len() > self.config.max_body_size {
                return payload_too_large();
            }
        }
        let mut req = Request::new(method, path.to_string(), headers, body);

        process_request(&mut req, &self.router, &self.handlers, &self.middleware).await
    }
}

fn bind_listener(addr: SocketAddr) -> std::io::Result<tokio::net::TcpListener> {
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

fn payload_too_large() -> Response {
    Response::json(r#"{"error": "Payload Too Large"}"#).with_status(413)
}

fn not_found() -> Response {
    Response::json(r#"{"error": "Not Found"}"#).with_status(404)
}

/// Core request processing logic (network agnostic)
async fn process_request(
    req: &mut Request,
    router: &Router,
    handlers: &[Handler],
    middleware: &MiddlewareChain,
) -> Response {
    if req.header("x-request-id").is_none() {
        let request_id = generate_request_id();
        req.set_header("x-request-id", &request_id);
    }

    let mut response = match middleware.run_before(req) {
        MiddlewareResult::Respond(resp) => resp,
        MiddlewareResult::Continue => match router.match_route(req.method, &req.path) {
            Ok(matched) => match handlers.get(matched.handler_id) {
                Some(handler) => handler(req.clone()).await,
                None => {
                    error!(handler_id = matched.handler_id, "Route has no handler");
                    Response::json(r#"{"error": "Internal Server Error"}"#).with_status(500)
                }
            },
            Err(_) => not_found(),
        },
    };

    if let Some(request_id) = req.header("x-request-id") {
        response.set_header("x-request-id", request_id);
    }
    middleware.run_after(req, &mut response);
    response
}

async fn handle_request(
    req: hyper::Request<hyper::body::Incoming>,
    router: &Router,
    handlers: &[Handler],
    middleware: &MiddlewareChain,
    max_body_size: usize,
) -> hyper::Response<Full<Bytes>> {
    let mut request = match Request::from_hyper_with_limit(req, max_body_size).await {
        Ok(r) => r,
        Err(e) if e.status_code() == 413 => {
            warn!(error = %e, "Rejected oversized request body");
            return payload_too_large().into_hyper();
        }
        Err(e) if e.status_code() == 404 => {
            return not_found().into_hyper();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read request");
            return Response::json(r#"{"error": "Bad Request"}"#)
                .with_status(e.status_code())
                .into_hyper();
        }
    };

    process_request(&mut request, router, handlers, middleware)
        .await
        .into_hyper()
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.as_nanos(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::CorsMiddleware;
    use crate::openapi::Info;

    fn echo_server() -> Server {
        let mut server = Server::new();
        server
            .add_route(
                Method::Get,
                "/echo",
                handler(|req: Request| async move {
                    Response::json_value(200, &req.query_map().get("say").cloned())
                }),
                Some(RouteDoc::new("Echo").response(200, "echoed")),
            )
            .unwrap();
        server
    }

    #[test]
    fn test_response_json() {
        let resp = Response::json(r#"{"status": "ok"}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
    }

    #[test]
    fn test_response_with_status() {
        let resp = Response::text("Not Found").with_status(404);
        assert_eq!(resp.status, 404);
    }

    #[test]
    fn test_response_into_hyper_sets_headers() {
        let resp = Response::json("{}")
            .with_status(422)
            .with_header("x-request-id", "abc")
            .into_hyper();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(resp.headers()["x-request-id"], "abc");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 3000);
        assert!(config.keep_alive);
    }

    #[tokio::test]
    async fn test_request_reaches_handler() {
        let server = echo_server();
        let resp = server
            .test_request(Method::Get, "/echo?say=hi", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#""hi""#);
        assert!(resp.headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_request_keeps_caller_request_id() {
        let server = echo_server();
        let headers = HashMap::from([("x-request-id".to_string(), "fixed-id".to_string())]);
        let resp = server
            .test_request(Method::Get, "/echo", headers, None)
            .await;
        assert_eq!(resp.headers.get("x-request-id").map(String::as_str), Some("fixed-id"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let server = echo_server();
        let resp = server
            .test_request(Method::Post, "/echo", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut server = echo_server();
        server.set_max_body_size(4);
        let resp = server
            .test_request(Method::Get, "/echo", HashMap::new(), Some(Bytes::from_static(b"12345")))
            .await;
        assert_eq!(resp.status, 413);
    }

    #[tokio::test]
    async fn test_preflight_answered_with_cors_headers() {
        let mut server = echo_server();
        server.add_middleware(CorsMiddleware::new());
        let resp = server
            .test_request(Method::Options, "/echo", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 204);
        assert!(resp.headers.contains_key("Access-Control-Allow-Origin"));
    }

    #[tokio::test]
    async fn test_mounted_docs() {
        let mut server = echo_server();
        server
            .mount_docs(&ApiDoc::new(Info::new("Echo API", "1.0.0")), "/docs", "Echo API")
            .unwrap();

        let page = server
            .test_request(Method::Get, "/docs", HashMap::new(), None)
            .await;
        assert_eq!(page.status, 200);
        assert!(page.content_type.starts_with("text/html"));

        let spec = server
            .test_request(Method::Get, "/docs/openapi.json", HashMap::new(), None)
            .await;
        let doc = spec.body_json().unwrap();
        assert_eq!(doc["paths"]["/echo"]["get"]["summary"], "Echo");
        assert!(doc["paths"].get("/docs").is_none());
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let server = Server::new().bind(([127, 0, 0, 1], 0).into());
        let token = CancellationToken::new();
        token.cancel();
        tokio_test::assert_ok!(server.serve_with_shutdown(token).await);
    }

    async fn spawn_echo(
        shutdown_timeout: Duration,
    ) -> (SocketAddr, CancellationToken, tokio::task::JoinHandle<Result<()>>) {
        let mut server = echo_server();
        server.config.shutdown_timeout = shutdown_timeout;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = CancellationToken::new();
        let serving = token.clone();
        let handle = tokio::spawn(async move { server.serve_on(listener, serving).await });
        (addr, token, handle)
    }

    async fn read_until(stream: &mut tokio::net::TcpStream, needle: &str) -> String {
        use tokio::io::AsyncReadExt;
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&received).contains(needle) {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before {needle:?} arrived");
            received.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&received).into_owned()
    }

    #[tokio::test]
    async fn test_cancel_closes_idle_keep_alive_connections() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (addr, token, handle) = spawn_echo(Duration::from_secs(5)).await;
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /echo?say=hi HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let reply = read_until(&mut stream, "\"hi\"").await;
        assert!(reply.starts_with("HTTP/1.1 200"));

        // The connection is now idle but kept alive
        token.cancel();
        let stopped = tokio::time::timeout(Duration::from_secs(2), handle).await;
        tokio_test::assert_ok!(stopped.unwrap().unwrap());

        let mut buf = [0u8; 64];
        let n = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf))
            .await
            .unwrap()
            .unwrap_or(0);
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_unrouted_method_over_socket_is_404() {
        use tokio::io::AsyncWriteExt;

        let (addr, token, handle) = spawn_echo(Duration::from_secs(5)).await;
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"TRACE /echo HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let reply = read_until(&mut stream, "Not Found").await;
        assert!(reply.starts_with("HTTP/1.1 404"));

        token.cancel();
        tokio_test::assert_ok!(handle.await.unwrap());
    }
}
