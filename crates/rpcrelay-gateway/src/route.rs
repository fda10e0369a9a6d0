//! Routes: a pool plus an optional method filter.
//!
//! Routes are matched in declaration order; a route with no filter
//! matches every request, so configs are authored specific-first.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rpcrelay_common::Result;

use crate::alert::AlertSink;
use crate::endpoint::{EndpointConfig, EndpointStatus};
use crate::pool::{Pool, PoolOptions};

/// Static configuration for one route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// Unique id within the gateway; also tags alert events.
    pub id: String,
    pub endpoints: Vec<EndpointConfig>,
    /// Method filter. Absent means the route matches any request.
    #[serde(default)]
    pub methods: Option<HashSet<String>>,
    #[serde(default)]
    pub failure_threshold: Option<u32>,
    #[serde(default)]
    pub min_healthy: Option<usize>,
}

impl RouteConfig {
    pub fn new(id: impl Into<String>, endpoints: Vec<EndpointConfig>) -> Self {
        Self {
            id: id.into(),
            endpoints,
            methods: None,
            failure_threshold: None,
            min_healthy: None,
        }
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}

/// A constructed route: the method filter and its pool.
pub struct Route {
    pub id: String,
    pub methods: Option<HashSet<String>>,
    pub pool: Arc<Pool>,
}

impl Route {
    pub fn from_config(config: RouteConfig, sink: Option<AlertSink>) -> Result<Self> {
        let options = PoolOptions {
            failure_threshold: config.failure_threshold,
            min_healthy: config.min_healthy,
            on_unhealthy: sink,
        };
        let pool = Pool::new(config.endpoints, options)?.with_route_id(&config.id);
        Ok(Self {
            id: config.id,
            methods: config.methods,
            pool: Arc::new(pool),
        })
    }

    /// Whether this route serves a request carrying `methods`.
    ///
    /// A filterless route matches anything; a filtered route matches
    /// only when every extracted method is in the filter.
    pub fn matches(&self, methods: &[String]) -> bool {
        match &self.methods {
            None => true,
            Some(filter) => methods.iter().all(|method| filter.contains(method)),
        }
    }
}

/// Route-level status snapshot returned by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStatus {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    pub endpoints: Vec<EndpointStatus>,
}
