//! Unhealthy-endpoint alert dispatch.
//!
//! An alert is emitted once per healthy → unhealthy transition, whether
//! the transition came from the failure threshold or a manual mark.
//! Delivery is fire-and-forget: the request path hands the event to a
//! detached task and never waits on the sink.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Notification payload for a healthy → unhealthy transition.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub endpoint_id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Callback contract for alert delivery. Sinks may be invoked
/// concurrently with request processing and must not assume
/// serialization.
pub type AlertSink = Arc<dyn Fn(AlertEvent) + Send + Sync>;

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Hands an event to the sink on a detached task. Sink panics are
/// contained and logged; they never reach the request path.
pub(crate) fn dispatch(sink: &AlertSink, event: AlertEvent) {
    let sink = Arc::clone(sink);
    tokio::spawn(async move {
        let endpoint_id = event.endpoint_id.clone();
        if catch_unwind(AssertUnwindSafe(|| sink(event))).is_err() {
            tracing::error!(endpoint = %endpoint_id, "alert sink panicked");
        }
    });
}
