//! Mock upstream JSON-RPC servers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Mutex;

pub struct MockState {
    label: String,
    status: AtomicU16,
    delay_ms: AtomicU64,
    hits: AtomicUsize,
    last_body: Mutex<Option<Bytes>>,
    last_headers: Mutex<Option<HeaderMap>>,
}

/// An in-process upstream that answers JSON-RPC requests with
/// `{"result": "<label>"}` envelopes, echoing ids for both single and
/// batch payloads. Status and latency are adjustable per test.
pub struct MockUpstream {
    addr: SocketAddr,
    state: Arc<MockState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start(label: &str) -> Self {
        let state = Arc::new(MockState {
            label: label.to_string(),
            status: AtomicU16::new(200),
            delay_ms: AtomicU64::new(0),
            hits: AtomicUsize::new(0),
            last_body: Mutex::new(None),
            last_headers: Mutex::new(None),
        });

        let app = Router::new()
            .route("/", post(handle))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock upstream serve");
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Overrides the response status for subsequent requests.
    pub fn set_status(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    /// Delays each response by the given amount.
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.state.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub async fn last_body(&self) -> Option<Bytes> {
        self.state.last_body.lock().await.clone()
    }

    pub async fn last_headers(&self) -> Option<HeaderMap> {
        self.state.last_headers.lock().await.clone()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().await = Some(body.clone());
    *state.last_headers.lock().await = Some(headers);

    let delay_ms = state.delay_ms.load(Ordering::SeqCst);
    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }

    let status = StatusCode::from_u16(state.status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !status.is_success() {
        return (status, Json(json!({"error": "upstream failure"}))).into_response();
    }

    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let reply = match &parsed {
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|entry| result_envelope(entry, &state.label))
                .collect(),
        ),
        single => result_envelope(single, &state.label),
    };
    (StatusCode::OK, Json(reply)).into_response()
}

fn result_envelope(request: &Value, label: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": request.get("id").cloned().unwrap_or(Value::Null),
        "result": label,
    })
}
