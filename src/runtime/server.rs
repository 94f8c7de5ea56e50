//! Application and HTTP server.
//!
//! [`App`] ties the pieces together: controllers are registered into the
//! router during the single-threaded setup phase, then [`App::run`] starts
//! the accept loop and every request flows through [`App::dispatch`]:
//! route match, bound-arguments construction, middleware-wrapped handler
//! invocation, envelope writing.

use crate::binding::Args;
use crate::controller::Controller;
use crate::http::{Method, ResponseBuilder};
use crate::runtime::router::{RouteEntry, RouteError, Router};
use crate::runtime::AppConfig;
use crate::service::ServiceRegistry;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// The application: configuration, service registry and route table.
///
/// Setup (installing services, registering controllers) is strictly
/// single-threaded and must complete before [`App::run`]; afterwards the
/// whole structure is shared read-only across connection tasks.
pub struct App {
    config: AppConfig,
    services: ServiceRegistry,
    router: Router,
}

impl App {
    /// Create a new application.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            services: ServiceRegistry::new(),
            router: Router::new(),
        }
    }

    /// Create an application with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AppConfig::default())
    }

    /// Mutable access to the service registry, for the setup phase.
    pub fn services(&mut self) -> &mut ServiceRegistry {
        &mut self.services
    }

    /// Read access to the service registry.
    pub fn service_registry(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Register a controller: obtain its endpoint table and turn every
    /// entry into a route.
    ///
    /// Each handler is wrapped with the table's middleware chain here, once;
    /// the composed handler is what the router stores. The route's gzip flag
    /// is the table's flag OR the global config flag.
    pub fn controller<C: Controller + 'static>(&mut self, controller: Arc<C>) {
        let table = controller.endpoints();
        let gzip = table.gzip_enabled() || self.config.gzip;
        for endpoint in table.iter() {
            let route = join_path(table.base(), endpoint.path());
            let handler = table.chain().wrap(endpoint.handler());
            self.router
                .register(endpoint.method(), &route, RouteEntry { handler, gzip });
            info!("Registered route: {} {}", endpoint.method(), route);
        }
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// Run one request through the full pipeline.
    ///
    /// `target` is the request path with its optional query string
    /// (`/user/42?name=X`). `body` is the collected request body; it is
    /// only handed to the binder on body-bearing methods. Public so tests
    /// can drive the pipeline without a socket.
    pub async fn dispatch(
        &self,
        method: Method,
        target: &str,
        body: Option<Bytes>,
    ) -> Response<Full<Bytes>> {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let (entry, params) = match self.router.dispatch(method, path) {
            Ok(matched) => matched,
            Err(RouteError::NotFound) => {
                return write_response(
                    ResponseBuilder::not_found(format!("no route for {} {}", method, path)),
                    self.config.gzip,
                );
            }
            Err(RouteError::MethodNotAllowed) => {
                return write_response(
                    ResponseBuilder::method_not_allowed(format!(
                        "method {} not allowed for {}",
                        method, path
                    )),
                    self.config.gzip,
                );
            }
        };

        let body = if method.has_body() {
            if let Some(ref bytes) = body {
                if bytes.len() > self.config.max_body_size {
                    return write_response(
                        ResponseBuilder::bad_request("request body too large"),
                        entry.gzip,
                    );
                }
            }
            body
        } else {
            None
        };

        let args = Args::new(params, query, body);
        let builder = match entry.handler.handle(args).await {
            Ok(builder) => builder,
            Err(bind_err) => {
                debug!("Binding failed for {} {}: {}", method, path, bind_err);
                ResponseBuilder::bad_request(bind_err.to_string())
            }
        };

        write_response(builder, entry.gzip)
    }

    /// Start the HTTP server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Server listening on {}", addr);

        let app = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = app.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let app = app.clone();
                    async move { handle_request(req, app, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Convert a hyper request and feed it through the dispatch pipeline.
async fn handle_request(
    req: Request<Incoming>,
    app: Arc<App>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = match Method::try_from(req.method()) {
        Ok(method) => method,
        Err(err) => {
            debug!("Rejecting request from {}: {}", remote_addr, err);
            return Ok(write_response(
                ResponseBuilder::method_not_allowed(err.to_string()),
                false,
            ));
        }
    };
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    debug!("Handling request: {} {} from {}", method, target, remote_addr);

    // The body is read at most once, and only for body-bearing methods.
    let body = if method.has_body() {
        match read_body(req.into_body(), app.config.max_body_size).await {
            Ok(body) => body,
            Err(builder) => return Ok(write_response(builder, false)),
        }
    } else {
        None
    };

    Ok(app.dispatch(method, &target, body).await)
}

/// Collect a request body, bounded by the configured size limit.
///
/// The limit is enforced while reading, so an oversized body never fully
/// buffers. Failure yields the response to write back.
async fn read_body<B>(body: B, limit: usize) -> Result<Option<Bytes>, ResponseBuilder>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            Ok(if bytes.is_empty() { None } else { Some(bytes) })
        }
        Err(err) if err.is::<LengthLimitError>() => {
            Err(ResponseBuilder::bad_request("request body too large"))
        }
        Err(err) => Err(ResponseBuilder::bad_request(err.to_string())),
    }
}

/// Compose a table's base path with an endpoint path.
fn join_path(base: &str, path: &str) -> String {
    let joined = format!("{}{}", base, path);
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Serialize the envelope and assemble the wire response: extra headers,
/// `Content-Type: application/json`, optional gzip, status, body.
fn write_response(builder: ResponseBuilder, route_gzip: bool) -> Response<Full<Bytes>> {
    let status = builder.status_code();
    let gzip = route_gzip || builder.wants_gzip();
    let headers = builder.headers().to_vec();
    let envelope = builder.into_envelope();

    let payload = match serde_json::to_vec(&envelope) {
        Ok(payload) => payload,
        Err(err) => {
            error!("Failed to serialize response envelope: {}", err);
            return plain_error_response();
        }
    };

    let mut response = Response::builder().status(
        hyper::StatusCode::from_u16(status.0).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR),
    );
    for (key, value) in headers {
        response = response.header(key, value);
    }
    response = response.header("Content-Type", "application/json");

    let payload = if gzip {
        match gzip_bytes(&payload) {
            Ok(compressed) => {
                response = response.header("Content-Encoding", "gzip");
                compressed
            }
            Err(err) => {
                // Identity fallback keeps the response readable.
                error!("Gzip encoding failed: {}", err);
                payload
            }
        }
    } else {
        payload
    };

    response
        .body(Full::new(Bytes::from(payload)))
        .unwrap_or_else(|err| {
            error!("Failed to assemble response: {}", err);
            plain_error_response()
        })
}

fn plain_error_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"statusCode":500,"status":"internal_error"}"#,
    )));
    *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    response
}

fn gzip_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
