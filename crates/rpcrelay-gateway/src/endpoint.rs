//! Endpoint configuration and runtime state.
//!
//! An [`EndpointConfig`] is supplied at pool construction and never
//! mutated afterwards. The pool turns each config into an [`Endpoint`]
//! carrying the mutable health fields; endpoint ids are stable for the
//! pool's lifetime and equal to the insertion index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

fn default_weight() -> u32 {
    1
}

/// Static configuration for one upstream target.
///
/// `weight` and `priority` are carried for compatibility with configs
/// written for weighted balancers; selection is strictly round-robin
/// and never consults them.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Upstream URL, used verbatim for every forwarded request.
    pub url: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub priority: i32,
    /// Headers injected into every upstream request. They overwrite
    /// caller-supplied headers on key collision.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request upstream timeout; expiry counts as a hard failure.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Method whitelist. Absent means every method is supported.
    #[serde(default)]
    pub methods: Option<HashSet<String>>,
    /// Method blocklist. Wins over the whitelist on conflict.
    #[serde(default)]
    pub blocked_methods: Option<HashSet<String>>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            weight: 1,
            priority: 0,
            headers: HashMap::new(),
            timeout_ms: None,
            methods: None,
            blocked_methods: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_blocked_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}

/// Runtime state for one upstream target.
///
/// Mutated only by the owning pool (forward outcomes and manual
/// overrides); snapshots handed out by the pool are value copies.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Stable id, `"endpoint-<index>"` by insertion order.
    pub id: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout_ms: Option<u64>,
    pub methods: Option<HashSet<String>>,
    pub blocked_methods: Option<HashSet<String>>,
    pub healthy: bool,
    pub consecutive_failures: u32,
    pub last_latency_ms: Option<u64>,
    pub last_error: Option<String>,
    /// Gates alert emission to at most one per unhealthy interval.
    pub alert_sent: bool,
}

impl Endpoint {
    pub(crate) fn from_config(index: usize, config: EndpointConfig) -> Self {
        Self {
            id: format!("endpoint-{index}"),
            url: config.url,
            headers: config.headers,
            timeout_ms: config.timeout_ms,
            methods: config.methods,
            blocked_methods: config.blocked_methods,
            healthy: true,
            consecutive_failures: 0,
            last_latency_ms: None,
            last_error: None,
            alert_sent: false,
        }
    }

    /// Whether this endpoint serves `method`: not blocklisted, and
    /// whitelisted when a whitelist exists.
    pub fn supports(&self, method: &str) -> bool {
        if let Some(blocked) = &self.blocked_methods {
            if blocked.contains(method) {
                return false;
            }
        }
        match &self.methods {
            Some(allowed) => allowed.contains(method),
            None => true,
        }
    }

    /// Whether this endpoint serves every method in the list.
    pub fn supports_all(&self, methods: &[String]) -> bool {
        methods.iter().all(|method| self.supports(method))
    }
}

/// Point-in-time health snapshot of one endpoint, in insertion order
/// within the pool's `status()` output.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStatus {
    pub id: String,
    pub url: String,
    pub healthy: bool,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<&Endpoint> for EndpointStatus {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id.clone(),
            url: endpoint.url.clone(),
            healthy: endpoint.healthy,
            consecutive_failures: endpoint.consecutive_failures,
            last_latency_ms: endpoint.last_latency_ms,
            last_error: endpoint.last_error.clone(),
        }
    }
}
