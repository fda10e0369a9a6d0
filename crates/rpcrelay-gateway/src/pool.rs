//! Health-tracked round-robin endpoint pool.
//!
//! The pool owns a fixed set of endpoints, chooses one per request,
//! forwards raw request bytes, and updates endpoint health from the
//! outcome. Selection and health mutation run under one lock, so the
//! cursor advances atomically and the failure-threshold arithmetic
//! never races; the upstream HTTP call itself runs outside the lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderMap, StatusCode};
use hyper::body::Bytes;
use tokio::sync::RwLock;

use rpcrelay_common::{RelayError, Result};

use crate::alert::{self, AlertEvent, AlertSink};
use crate::endpoint::{Endpoint, EndpointConfig, EndpointStatus};
use crate::headers;

/// Pool-level tuning knobs.
#[derive(Clone, Default)]
pub struct PoolOptions {
    /// Consecutive failures before an endpoint turns unhealthy.
    /// Zero means the default of 3.
    pub failure_threshold: Option<u32>,
    /// Below this many healthy endpoints, selection falls back to the
    /// full candidate set. Defaults to 1.
    pub min_healthy: Option<usize>,
    /// Invoked once per healthy → unhealthy transition.
    pub on_unhealthy: Option<AlertSink>,
}

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_MIN_HEALTHY: usize = 1;

/// A response passed back verbatim from an upstream endpoint.
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

struct PoolInner {
    endpoints: Vec<Endpoint>,
    cursor: usize,
    last_used: Option<Endpoint>,
}

impl PoolInner {
    fn find_mut(&mut self, url_or_id: &str) -> Option<&mut Endpoint> {
        self.endpoints
            .iter_mut()
            .find(|endpoint| endpoint.id == url_or_id || endpoint.url == url_or_id)
    }

    /// Deterministic selection. Never fails on a constructed pool: when
    /// filters exclude everything, selection falls back to healthy
    /// endpoints ignoring the method filter, then to all endpoints.
    fn select(&mut self, methods: &[String], min_healthy: usize) -> Endpoint {
        let candidates: Vec<usize> = self
            .endpoints
            .iter()
            .enumerate()
            .filter(|(_, endpoint)| endpoint.supports_all(methods))
            .map(|(index, _)| index)
            .collect();
        let healthy: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| self.endpoints[index].healthy)
            .collect();

        let mut pool = if healthy.len() >= min_healthy {
            healthy
        } else {
            candidates
        };
        if pool.is_empty() {
            pool = self
                .endpoints
                .iter()
                .enumerate()
                .filter(|(_, endpoint)| endpoint.healthy)
                .map(|(index, _)| index)
                .collect();
        }
        if pool.is_empty() {
            pool = (0..self.endpoints.len()).collect();
        }

        let chosen = pool[self.cursor % pool.len()];
        self.cursor = (self.cursor + 1) % pool.len();
        self.endpoints[chosen].clone()
    }
}

/// Health-tracked, round-robin selector over a fixed endpoint set.
///
/// Shared across request handlers behind `Arc`; all operations are safe
/// to call concurrently.
pub struct Pool {
    inner: Arc<RwLock<PoolInner>>,
    client: reqwest::Client,
    failure_threshold: u32,
    min_healthy: usize,
    on_unhealthy: Option<AlertSink>,
    route_id: Option<String>,
}

impl Pool {
    /// Builds a pool from endpoint configs.
    ///
    /// Fails when the config list is empty or any entry has an empty
    /// URL; a pool that constructs always has something to select.
    pub fn new(endpoints: Vec<EndpointConfig>, options: PoolOptions) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(RelayError::InvalidConfig(
                "pool requires at least one endpoint".to_string(),
            ));
        }
        if let Some(position) = endpoints.iter().position(|config| config.url.trim().is_empty()) {
            return Err(RelayError::InvalidConfig(format!(
                "endpoint {position} has an empty url"
            )));
        }
        let failure_threshold = options.failure_threshold.unwrap_or(DEFAULT_FAILURE_THRESHOLD);
        if failure_threshold == 0 {
            return Err(RelayError::InvalidConfig(
                "failure_threshold must be positive".to_string(),
            ));
        }

        let endpoints = endpoints
            .into_iter()
            .enumerate()
            .map(|(index, config)| Endpoint::from_config(index, config))
            .collect();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| RelayError::Client(err.to_string()))?;

        Ok(Self {
            inner: Arc::new(RwLock::new(PoolInner {
                endpoints,
                cursor: 0,
                last_used: None,
            })),
            client,
            failure_threshold,
            min_healthy: options.min_healthy.unwrap_or(DEFAULT_MIN_HEALTHY),
            on_unhealthy: options.on_unhealthy,
            route_id: None,
        })
    }

    /// Tags alerts from this pool with a route id.
    pub fn with_route_id(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    /// Picks the next endpoint for the given methods and advances the
    /// round-robin cursor. Returns a snapshot.
    pub async fn select(&self, methods: &[String]) -> Endpoint {
        let mut inner = self.inner.write().await;
        inner.select(methods, self.min_healthy)
    }

    /// Forwards raw body bytes to a selected endpoint.
    ///
    /// The body is POSTed unmodified; caller headers are merged with
    /// endpoint headers per the proxy contract. Responses with any HTTP
    /// status come back verbatim (health updated from the status);
    /// requests that produce no HTTP response at all surface as errors.
    pub async fn forward(
        &self,
        body: Bytes,
        request_headers: &HeaderMap,
        methods: &[String],
    ) -> Result<ForwardedResponse> {
        let endpoint = {
            let mut inner = self.inner.write().await;
            let endpoint = inner.select(methods, self.min_healthy);
            inner.last_used = Some(endpoint.clone());
            endpoint
        };

        let upstream_headers = headers::merge_headers(request_headers, &endpoint.headers);
        let mut request = self
            .client
            .post(&endpoint.url)
            .headers(upstream_headers)
            .body(body);
        if let Some(timeout_ms) = endpoint.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }

        // A downstream disconnect drops this future mid-await, which
        // cancels the upstream call. The guard routes that cancellation
        // through the hard-failure path; it is disarmed once the
        // outcome has been classified normally.
        let mut guard = CancelGuard::arm(self, &endpoint.id);

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let relay_err = if err.is_timeout() {
                    RelayError::Timeout(endpoint.timeout_ms.unwrap_or_default())
                } else {
                    RelayError::Upstream(err.to_string())
                };
                self.record_failure(&endpoint.id, relay_err.to_string(), None)
                    .await;
                guard.disarm();
                return Err(relay_err);
            }
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        let status = response.status();
        let response_headers = headers::strip_hop_by_hop(response.headers());
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                // The response body never fully arrived; treat it like a
                // dropped connection.
                let relay_err = RelayError::Upstream(err.to_string());
                self.record_failure(&endpoint.id, relay_err.to_string(), None)
                    .await;
                guard.disarm();
                return Err(relay_err);
            }
        };

        if status.is_success() {
            guard.disarm();
            self.record_success(&endpoint.id, latency_ms).await;
        } else {
            self.record_failure(
                &endpoint.id,
                format!("HTTP {}", status.as_u16()),
                Some(latency_ms),
            )
            .await;
            guard.disarm();
        }

        Ok(ForwardedResponse {
            status,
            headers: response_headers,
            body: bytes,
        })
    }

    /// Manually restores an endpoint, by id or URL. No-op when absent.
    pub async fn mark_healthy(&self, url_or_id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(endpoint) = inner.find_mut(url_or_id) {
            endpoint.healthy = true;
            endpoint.consecutive_failures = 0;
            endpoint.last_error = None;
            endpoint.alert_sent = false;
            tracing::info!(endpoint = %endpoint.id, url = %endpoint.url, "endpoint manually marked healthy");
        }
    }

    /// Manually evicts an endpoint, by id or URL. Emits an alert on the
    /// healthy → unhealthy transition (or when none was sent yet for
    /// the current unhealthy interval); repeated calls within one
    /// interval stay silent. No-op when absent.
    pub async fn mark_unhealthy(&self, url_or_id: &str, reason: Option<&str>) {
        let event = {
            let mut inner = self.inner.write().await;
            let route_id = self.route_id.clone();
            let Some(endpoint) = inner.find_mut(url_or_id) else {
                return;
            };
            endpoint.healthy = false;
            endpoint.last_error = reason.map(str::to_string);
            tracing::warn!(
                endpoint = %endpoint.id,
                url = %endpoint.url,
                reason = reason.unwrap_or("manual"),
                "endpoint manually marked unhealthy"
            );
            if endpoint.alert_sent {
                None
            } else {
                endpoint.alert_sent = true;
                Some(make_event(endpoint, route_id))
            }
        };
        self.emit(event);
    }

    /// Health snapshot of every endpoint, in insertion order.
    pub async fn status(&self) -> Vec<EndpointStatus> {
        let inner = self.inner.read().await;
        inner.endpoints.iter().map(EndpointStatus::from).collect()
    }

    /// Snapshot of the endpoint chosen by the most recent `forward`.
    pub async fn last_used(&self) -> Option<Endpoint> {
        let inner = self.inner.read().await;
        inner.last_used.clone()
    }

    async fn record_success(&self, id: &str, latency_ms: u64) {
        let mut inner = self.inner.write().await;
        if let Some(endpoint) = inner.find_mut(id) {
            if !endpoint.healthy {
                tracing::info!(endpoint = %endpoint.id, url = %endpoint.url, "endpoint recovered");
            }
            endpoint.healthy = true;
            endpoint.consecutive_failures = 0;
            endpoint.last_latency_ms = Some(latency_ms);
            endpoint.last_error = None;
            endpoint.alert_sent = false;
        }
    }

    async fn record_failure(&self, id: &str, reason: String, latency_ms: Option<u64>) {
        apply_failure(
            &self.inner,
            &self.on_unhealthy,
            &self.route_id,
            self.failure_threshold,
            id,
            reason,
            latency_ms,
        )
        .await;
    }

    fn emit(&self, event: Option<AlertEvent>) {
        if let (Some(event), Some(sink)) = (event, &self.on_unhealthy) {
            alert::dispatch(sink, event);
        }
    }
}

/// One failure observation: bump the counter, stamp the error, and
/// apply the threshold transition with its single alert. Shared by the
/// forward outcome paths and the cancellation guard.
async fn apply_failure(
    inner: &RwLock<PoolInner>,
    on_unhealthy: &Option<AlertSink>,
    route_id: &Option<String>,
    threshold: u32,
    id: &str,
    reason: String,
    latency_ms: Option<u64>,
) {
    let event = {
        let mut inner = inner.write().await;
        let Some(endpoint) = inner.find_mut(id) else {
            return;
        };
        endpoint.consecutive_failures += 1;
        endpoint.last_error = Some(reason);
        if let Some(latency_ms) = latency_ms {
            endpoint.last_latency_ms = Some(latency_ms);
        }
        if endpoint.consecutive_failures >= threshold && endpoint.healthy {
            endpoint.healthy = false;
            tracing::warn!(
                endpoint = %endpoint.id,
                url = %endpoint.url,
                failures = endpoint.consecutive_failures,
                error = endpoint.last_error.as_deref().unwrap_or(""),
                "endpoint marked unhealthy"
            );
            if endpoint.alert_sent {
                None
            } else {
                endpoint.alert_sent = true;
                Some(make_event(endpoint, route_id.clone()))
            }
        } else {
            None
        }
    };
    if let (Some(event), Some(sink)) = (event, on_unhealthy) {
        alert::dispatch(sink, event);
    }
}

/// Counts a caller-cancelled forward as a hard failure.
///
/// While armed, dropping the guard (the handler future was dropped
/// before the outcome was classified) records the failure on a
/// detached task, since `Drop` cannot await the pool lock.
struct CancelGuard {
    inner: Arc<RwLock<PoolInner>>,
    on_unhealthy: Option<AlertSink>,
    route_id: Option<String>,
    failure_threshold: u32,
    endpoint_id: String,
    armed: bool,
}

impl CancelGuard {
    fn arm(pool: &Pool, endpoint_id: &str) -> Self {
        Self {
            inner: pool.inner.clone(),
            on_unhealthy: pool.on_unhealthy.clone(),
            route_id: pool.route_id.clone(),
            failure_threshold: pool.failure_threshold,
            endpoint_id: endpoint_id.to_string(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let inner = self.inner.clone();
        let on_unhealthy = self.on_unhealthy.take();
        let route_id = self.route_id.take();
        let threshold = self.failure_threshold;
        let endpoint_id = std::mem::take(&mut self.endpoint_id);
        tracing::debug!(endpoint = %endpoint_id, "caller cancelled in-flight upstream request");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                apply_failure(
                    &inner,
                    &on_unhealthy,
                    &route_id,
                    threshold,
                    &endpoint_id,
                    "request cancelled by caller".to_string(),
                    None,
                )
                .await;
            });
        }
    }
}

fn make_event(endpoint: &Endpoint, route_id: Option<String>) -> AlertEvent {
    AlertEvent {
        endpoint_id: endpoint.id.clone(),
        url: endpoint.url.clone(),
        route_id,
        consecutive_failures: endpoint.consecutive_failures,
        last_error: endpoint.last_error.clone(),
        timestamp: alert::now_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn pool_of(urls: &[&str]) -> Pool {
        let endpoints = urls.iter().map(|url| EndpointConfig::new(*url)).collect();
        Pool::new(endpoints, PoolOptions::default()).unwrap()
    }

    fn capturing_sink() -> (AlertSink, Arc<Mutex<Vec<AlertEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink: AlertSink = {
            let events = events.clone();
            Arc::new(move |event| {
                events.lock().unwrap().push(event);
            })
        };
        (sink, events)
    }

    #[test]
    fn test_empty_pool_rejected() {
        let result = Pool::new(vec![], PoolOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = Pool::new(
            vec![EndpointConfig::new("http://a.example"), EndpointConfig::new("  ")],
            PoolOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = Pool::new(
            vec![EndpointConfig::new("http://a.example")],
            PoolOptions {
                failure_threshold: Some(0),
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_round_robin_rotation() {
        let pool = pool_of(&["http://a.example", "http://b.example", "http://c.example"]);
        let mut urls = Vec::new();
        for _ in 0..4 {
            urls.push(pool.select(&[]).await.url);
        }
        assert_eq!(
            urls,
            vec![
                "http://a.example",
                "http://b.example",
                "http://c.example",
                "http://a.example"
            ]
        );
    }

    #[tokio::test]
    async fn test_round_robin_fairness() {
        let pool = pool_of(&["http://a.example", "http://b.example", "http://c.example"]);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..300 {
            let endpoint = pool.select(&[]).await;
            *counts.entry(endpoint.id).or_insert(0) += 1;
        }
        assert_eq!(counts["endpoint-0"], 100);
        assert_eq!(counts["endpoint-1"], 100);
        assert_eq!(counts["endpoint-2"], 100);
    }

    #[tokio::test]
    async fn test_single_endpoint_always_selected() {
        let pool = pool_of(&["http://only.example"]);
        pool.mark_unhealthy("endpoint-0", Some("down")).await;
        // Unhealthy or not, it is the only option.
        let endpoint = pool.select(&[]).await;
        assert_eq!(endpoint.url, "http://only.example");
        assert!(!endpoint.healthy);
    }

    #[tokio::test]
    async fn test_unhealthy_skipped_when_enough_healthy() {
        let pool = pool_of(&["http://a.example", "http://b.example", "http://c.example"]);
        pool.mark_unhealthy("http://b.example", None).await;
        let mut urls = Vec::new();
        for _ in 0..4 {
            urls.push(pool.select(&[]).await.url);
        }
        assert!(!urls.contains(&"http://b.example".to_string()));
    }

    #[tokio::test]
    async fn test_min_healthy_fallback_serves_full_candidate_set() {
        let endpoints = vec![
            EndpointConfig::new("http://a.example"),
            EndpointConfig::new("http://b.example"),
        ];
        let pool = Pool::new(
            endpoints,
            PoolOptions {
                min_healthy: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        pool.mark_unhealthy("http://a.example", None).await;

        // One healthy endpoint is below min_healthy, so both endpoints
        // stay in rotation.
        let mut urls = std::collections::HashSet::new();
        for _ in 0..2 {
            urls.insert(pool.select(&[]).await.url);
        }
        assert!(urls.contains("http://a.example"));
        assert!(urls.contains("http://b.example"));
    }

    #[tokio::test]
    async fn test_method_filter_restricts_candidates() {
        let endpoints = vec![
            EndpointConfig::new("http://heavy.example"),
            EndpointConfig::new("http://general.example")
                .with_blocked_methods(["getProgramAccounts"]),
        ];
        let pool = Pool::new(endpoints, PoolOptions::default()).unwrap();

        for _ in 0..3 {
            let endpoint = pool
                .select(&["getProgramAccounts".to_string()])
                .await;
            assert_eq!(endpoint.url, "http://heavy.example");
        }
        // Without the filter, both endpoints rotate.
        let first = pool.select(&[]).await;
        let second = pool.select(&[]).await;
        assert_ne!(first.url, second.url);
    }

    #[tokio::test]
    async fn test_method_filter_excluding_all_falls_back() {
        let endpoints = vec![
            EndpointConfig::new("http://a.example").with_blocked_methods(["getLogs"]),
            EndpointConfig::new("http://b.example").with_blocked_methods(["getLogs"]),
        ];
        let pool = Pool::new(endpoints, PoolOptions::default()).unwrap();
        // Nothing supports the method; selection still returns an endpoint.
        let endpoint = pool.select(&["getLogs".to_string()]).await;
        assert!(endpoint.url.ends_with(".example"));
    }

    #[tokio::test]
    async fn test_threshold_eviction_and_single_alert() {
        let (sink, events) = capturing_sink();
        let pool = Pool::new(
            vec![EndpointConfig::new("http://a.example")],
            PoolOptions {
                on_unhealthy: Some(sink),
                ..Default::default()
            },
        )
        .unwrap();

        pool.record_failure("endpoint-0", "HTTP 500".to_string(), Some(12))
            .await;
        pool.record_failure("endpoint-0", "HTTP 500".to_string(), Some(15))
            .await;
        assert!(pool.status().await[0].healthy);

        pool.record_failure("endpoint-0", "HTTP 500".to_string(), Some(11))
            .await;
        let status = &pool.status().await[0];
        assert!(!status.healthy);
        assert_eq!(status.consecutive_failures, 3);
        assert_eq!(status.last_error.as_deref(), Some("HTTP 500"));

        // Further failures deepen the counter but never re-alert.
        pool.record_failure("endpoint-0", "HTTP 500".to_string(), Some(9))
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].endpoint_id, "endpoint-0");
        assert_eq!(events[0].consecutive_failures, 3);
        assert_eq!(events[0].last_error.as_deref(), Some("HTTP 500"));
    }

    #[tokio::test]
    async fn test_success_resets_health_and_alert_gate() {
        let pool = pool_of(&["http://a.example"]);
        for _ in 0..3 {
            pool.record_failure("endpoint-0", "connect error".to_string(), None)
                .await;
        }
        assert!(!pool.status().await[0].healthy);

        pool.record_success("endpoint-0", 42).await;
        let status = &pool.status().await[0];
        assert!(status.healthy);
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_error.is_none());
        assert_eq!(status.last_latency_ms, Some(42));

        let inner = pool.inner.read().await;
        assert!(!inner.endpoints[0].alert_sent);
    }

    #[tokio::test]
    async fn test_mark_unhealthy_then_healthy_roundtrip() {
        let pool = pool_of(&["http://a.example"]);
        pool.mark_unhealthy("endpoint-0", Some("maintenance")).await;
        let status = &pool.status().await[0];
        assert!(!status.healthy);
        assert_eq!(status.last_error.as_deref(), Some("maintenance"));

        pool.mark_healthy("endpoint-0").await;
        let status = &pool.status().await[0];
        assert!(status.healthy);
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn test_mark_healthy_idempotent() {
        let pool = pool_of(&["http://a.example"]);
        pool.mark_healthy("endpoint-0").await;
        pool.mark_healthy("endpoint-0").await;
        let status = &pool.status().await[0];
        assert!(status.healthy);
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_repeated_mark_unhealthy_alerts_once() {
        let (sink, events) = capturing_sink();
        let pool = Pool::new(
            vec![EndpointConfig::new("http://a.example")],
            PoolOptions {
                on_unhealthy: Some(sink),
                ..Default::default()
            },
        )
        .unwrap();

        pool.mark_unhealthy("endpoint-0", Some("down")).await;
        pool.mark_unhealthy("endpoint-0", Some("still down")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(events.lock().unwrap().len(), 1);

        // Recovery re-arms the gate; the next interval alerts again.
        pool.mark_healthy("endpoint-0").await;
        pool.mark_unhealthy("endpoint-0", Some("down again")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_unknown_endpoint_is_noop() {
        let pool = pool_of(&["http://a.example"]);
        pool.mark_unhealthy("http://nope.example", None).await;
        pool.mark_healthy("endpoint-9").await;
        assert!(pool.status().await[0].healthy);
    }

    #[tokio::test]
    async fn test_status_in_insertion_order() {
        let pool = pool_of(&["http://a.example", "http://b.example", "http://c.example"]);
        let ids: Vec<String> = pool.status().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["endpoint-0", "endpoint-1", "endpoint-2"]);
    }

    #[tokio::test]
    async fn test_last_used_empty_before_forward() {
        let pool = pool_of(&["http://a.example"]);
        assert!(pool.last_used().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_select_stays_fair() {
        let pool = Arc::new(pool_of(&[
            "http://a.example",
            "http://b.example",
            "http://c.example",
            "http://d.example",
        ]));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..100 {
                    ids.push(pool.select(&[]).await.id);
                }
                ids
            }));
        }

        let mut counts = std::collections::HashMap::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                *counts.entry(id).or_insert(0u32) += 1;
            }
        }
        assert_eq!(counts.values().sum::<u32>(), 800);
        for count in counts.values() {
            assert_eq!(*count, 200);
        }
    }
}
