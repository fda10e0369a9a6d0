//! rpcrelay Gateway
//!
//! This crate provides the dispatch and health subsystem of rpcrelay, a
//! chain-agnostic reverse proxy for JSON-RPC 2.0 over HTTP.
//!
//! # Architecture
//!
//! The gateway is a deliberately thin forwarder. It never interprets
//! RPC semantics beyond method names:
//!
//! 1. **Pools** track health across a fixed set of upstream endpoints
//!    and pick one per request via a round-robin cursor
//! 2. **Routes** bind a pool to an optional method filter; the first
//!    declared match wins
//! 3. **The gateway** parses single and batch JSON-RPC envelopes,
//!    resolves a route, forwards the raw bytes, and shapes every
//!    pre-forward failure into a JSON-RPC error
//! 4. **Alerts** fire once per healthy → unhealthy transition, on a
//!    detached task that never blocks the request path
//!
//! # Health Model
//!
//! Health is passive: it is driven entirely by forward outcomes and
//! manual overrides. An endpoint turns unhealthy after a configurable
//! number of consecutive failures and recovers on any success. When
//! too few endpoints are healthy, selection falls back to the full
//! candidate set rather than refusing to serve.
//!
//! # Example
//!
//! ```no_run
//! use rpcrelay_gateway::{EndpointConfig, Gateway, GatewayConfig, RouteConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::new(
//!     8545,
//!     vec![
//!         RouteConfig::new(
//!             "heavy",
//!             vec![EndpointConfig::new("https://archive.example/rpc")],
//!         )
//!         .with_methods(["getProgramAccounts"]),
//!         RouteConfig::new(
//!             "default",
//!             vec![
//!                 EndpointConfig::new("https://rpc-a.example"),
//!                 EndpointConfig::new("https://rpc-b.example"),
//!             ],
//!         ),
//!     ],
//! );
//!
//! let gateway = Gateway::new(config)?;
//! gateway.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod endpoint;
pub mod gateway;
pub mod headers;
pub mod pool;
pub mod route;

pub use alert::{AlertEvent, AlertSink};
pub use endpoint::{Endpoint, EndpointConfig, EndpointStatus};
pub use gateway::{CorsConfig, Gateway, GatewayConfig};
pub use pool::{ForwardedResponse, Pool, PoolOptions};
pub use route::{Route, RouteConfig, RouteStatus};
