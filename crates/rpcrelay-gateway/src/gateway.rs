//! HTTP front-end.
//!
//! The gateway accepts JSON-RPC over HTTP, resolves a route for each
//! request, forwards the raw bytes through the route's pool, and shapes
//! every pre-forward failure into a JSON-RPC error envelope. Forwarded
//! responses come back verbatim: upstream status, filtered headers,
//! body bytes.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
};
use http::request::Parts;
use http::{HeaderMap, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use rpcrelay_common::protocol::{JsonRpcError, RpcPayload};
use rpcrelay_common::{RelayError, Result};

use crate::alert::AlertSink;
use crate::pool::Pool;
use crate::route::{Route, RouteConfig, RouteStatus};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_body_bytes() -> usize {
    1_000_000
}

/// CORS contract. Origins are matched exactly; the allow-origin header
/// echoes the request origin when allowed, falls back to the first
/// configured origin, then to `*`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub origins: Vec<String>,
    /// Overrides the `POST, OPTIONS` preflight default.
    #[serde(default)]
    pub methods: Option<String>,
    /// Overrides the `content-type` preflight default.
    #[serde(default)]
    pub headers: Option<String>,
}

/// Gateway configuration. Deserializable from JSON; the alert sink is
/// wired programmatically.
#[derive(Deserialize)]
pub struct GatewayConfig {
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    pub routes: Vec<RouteConfig>,
    /// Route used when no declared route matches.
    #[serde(default)]
    pub default_route_id: Option<String>,
    /// Global method allowlist applied before route resolution.
    #[serde(default)]
    pub allowed_methods: Option<HashSet<String>>,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// `GET` to this path answers `200 OK` outside the RPC pipeline.
    #[serde(default)]
    pub health_check_path: Option<String>,
    #[serde(skip)]
    pub on_endpoint_unhealthy: Option<AlertSink>,
}

impl GatewayConfig {
    pub fn new(port: u16, routes: Vec<RouteConfig>) -> Self {
        Self {
            port,
            host: default_host(),
            routes,
            default_route_id: None,
            allowed_methods: None,
            cors: None,
            max_body_bytes: default_max_body_bytes(),
            health_check_path: None,
            on_endpoint_unhealthy: None,
        }
    }
}

struct GatewayInner {
    routes: Vec<Route>,
    default_route: Option<usize>,
    allowed_methods: Option<HashSet<String>>,
    cors: Option<CorsConfig>,
    max_body_bytes: usize,
    health_check_path: Option<String>,
}

#[derive(Default)]
struct ServerState {
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

/// The JSON-RPC reverse proxy server.
///
/// Owns its routes (and transitively their pools). `start` and `stop`
/// are both idempotent; stopping lets in-flight requests complete.
pub struct Gateway {
    inner: Arc<GatewayInner>,
    bind_addr: SocketAddr,
    server: Mutex<ServerState>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.routes.is_empty() {
            return Err(RelayError::InvalidConfig(
                "gateway requires at least one route".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for route in &config.routes {
            if !seen.insert(route.id.clone()) {
                return Err(RelayError::InvalidConfig(format!(
                    "duplicate route id '{}'",
                    route.id
                )));
            }
        }

        let sink = config.on_endpoint_unhealthy;
        let routes = config
            .routes
            .into_iter()
            .map(|route| Route::from_config(route, sink.clone()))
            .collect::<Result<Vec<_>>>()?;

        let default_route = match &config.default_route_id {
            Some(id) => Some(
                routes
                    .iter()
                    .position(|route| &route.id == id)
                    .ok_or_else(|| {
                        RelayError::InvalidConfig(format!("default route '{id}' is not defined"))
                    })?,
            ),
            None => None,
        };

        let bind_addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|err| {
                RelayError::InvalidConfig(format!(
                    "invalid bind address {}:{}: {err}",
                    config.host, config.port
                ))
            })?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                routes,
                default_route,
                allowed_methods: config.allowed_methods,
                cors: config.cors,
                max_body_bytes: config.max_body_bytes,
                health_check_path: config.health_check_path,
            }),
            bind_addr,
            server: Mutex::new(ServerState::default()),
        })
    }

    /// Binds the listening socket and starts serving. A second call
    /// while already bound is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut server = self.server.lock().await;
        if server.handle.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "gateway listening");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let app = axum::Router::new()
            .fallback(handle)
            .with_state(self.inner.clone());

        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.changed().await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %err, "gateway server error");
            }
        });

        server.shutdown = Some(shutdown_tx);
        server.handle = Some(handle);
        server.local_addr = Some(local_addr);
        Ok(())
    }

    /// Stops accepting connections and waits for in-flight requests to
    /// finish. Safe to call repeatedly.
    pub async fn stop(&self) {
        let (shutdown, handle) = {
            let mut server = self.server.lock().await;
            server.local_addr = None;
            (server.shutdown.take(), server.handle.take())
        };
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// The bound address while running (useful with port 0).
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.server.lock().await.local_addr
    }

    /// Per-route status snapshots, in declaration order.
    pub async fn status(&self) -> Vec<RouteStatus> {
        let mut statuses = Vec::with_capacity(self.inner.routes.len());
        for route in &self.inner.routes {
            let mut methods: Option<Vec<String>> = route
                .methods
                .as_ref()
                .map(|filter| filter.iter().cloned().collect());
            if let Some(methods) = methods.as_mut() {
                methods.sort();
            }
            statuses.push(RouteStatus {
                id: route.id.clone(),
                methods,
                endpoints: route.pool.status().await,
            });
        }
        statuses
    }

    /// Direct pool access for harnesses and manual health overrides.
    pub fn balancer(&self, route_id: &str) -> Option<Arc<Pool>> {
        self.inner
            .routes
            .iter()
            .find(|route| route.id == route_id)
            .map(|route| route.pool.clone())
    }
}

async fn handle(State(inner): State<Arc<GatewayInner>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let cors_origin = inner
        .cors
        .as_ref()
        .map(|cors| allow_origin(cors, &parts.headers));

    if parts.method == Method::OPTIONS {
        if let Some(cors) = &inner.cors {
            return preflight(cors, cors_origin);
        }
    }

    let health_hit = inner
        .health_check_path
        .as_ref()
        .is_some_and(|path| parts.method == Method::GET && parts.uri.path() == path.as_str());
    let mut response = if health_hit {
        (StatusCode::OK, "OK").into_response()
    } else {
        handle_rpc(&inner, parts, body).await
    };

    if let Some(origin) = cors_origin {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    response
}

async fn handle_rpc(inner: &GatewayInner, parts: Parts, body: Body) -> Response {
    if parts.method != Method::POST {
        return plain_error(StatusCode::METHOD_NOT_ALLOWED, "Only POST is supported.");
    }

    let bytes = match axum::body::to_bytes(body, inner.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return plain_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.");
        }
    };

    let payload = RpcPayload::parse(&bytes);
    if payload == RpcPayload::Malformed {
        return rpc_error(&payload, &JsonRpcError::parse_error());
    }

    let methods = payload.methods();
    if methods.is_empty() {
        return rpc_error(&payload, &JsonRpcError::invalid_request());
    }

    if let Some(allowed) = &inner.allowed_methods {
        if let Some(denied) = methods.iter().find(|method| !allowed.contains(*method)) {
            return rpc_error(&payload, &JsonRpcError::method_not_allowed(denied));
        }
    }

    let route = inner
        .routes
        .iter()
        .find(|route| route.matches(&methods))
        .or_else(|| inner.default_route.map(|index| &inner.routes[index]));
    let Some(route) = route else {
        return rpc_error(&payload, &JsonRpcError::method_not_found());
    };

    match route.pool.forward(bytes, &parts.headers, &methods).await {
        Ok(forwarded) => {
            let mut response = Response::new(Body::from(forwarded.body));
            *response.status_mut() = forwarded.status;
            *response.headers_mut() = forwarded.headers;
            response
        }
        Err(err) => {
            tracing::warn!(route = %route.id, error = %err, "upstream request failed");
            plain_error(
                StatusCode::BAD_GATEWAY,
                "Bad Gateway: Upstream request failed.",
            )
        }
    }
}

/// Non-JSON-RPC failures (method gate, body cap, upstream hard failure).
fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Pre-forward failures are always HTTP 200 with a JSON-RPC envelope.
fn rpc_error(payload: &RpcPayload, error: &JsonRpcError) -> Response {
    (StatusCode::OK, Json(payload.error_body(error))).into_response()
}

fn preflight(cors: &CorsConfig, origin: Option<HeaderValue>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    if let Some(origin) = origin {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    let methods = cors.methods.as_deref().unwrap_or("POST, OPTIONS");
    let allow_headers = cors.headers.as_deref().unwrap_or("content-type");
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_str(methods).unwrap_or_else(|_| HeaderValue::from_static("POST, OPTIONS")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_str(allow_headers)
            .unwrap_or_else(|_| HeaderValue::from_static("content-type")),
    );
    response
}

/// Resolves the allow-origin value: echo the request origin when it is
/// in the allow list, else the first configured origin, else `*`.
fn allow_origin(cors: &CorsConfig, request_headers: &HeaderMap) -> HeaderValue {
    let request_origin = request_headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok());
    let chosen = match request_origin {
        Some(origin) if cors.origins.iter().any(|allowed| allowed == origin) => origin,
        _ => match cors.origins.first() {
            Some(first) => first.as_str(),
            None => "*",
        },
    };
    HeaderValue::from_str(chosen).unwrap_or_else(|_| HeaderValue::from_static("*"))
}
