//! # rpcrelay CLI Entry Point
//!
//! Main binary for the rpcrelay JSON-RPC reverse proxy.
//!
//! ## Usage
//!
//! ```bash
//! # Serve from a JSON config file (routes, CORS, allowlist, ...)
//! rpcrelay serve -c gateway.json
//!
//! # Serve a single round-robin route from flags
//! rpcrelay serve -b 0.0.0.0:8545 \
//!   -e https://rpc-a.example \
//!   -e https://rpc-b.example
//! ```
//!
//! Endpoint URLs must include the `http://` or `https://` prefix.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;

use rpcrelay_gateway::{AlertEvent, EndpointConfig, Gateway, GatewayConfig, RouteConfig};

/// Validates that a URL string starts with http:// or https://
fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!(
            "Invalid {}: '{}' must start with http:// or https://",
            description,
            url
        ))
    }
}

#[derive(FromArgs)]
/// rpcrelay - health-tracked JSON-RPC reverse proxy
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
}

/// Arguments for starting the gateway.
///
/// Either point at a JSON configuration file with `-c`, or describe a
/// single default route inline with `-b`/`-e` flags. The config file
/// wins when both are given.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start the JSON-RPC gateway
struct ServeArgs {
    /// path to a JSON gateway configuration file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// address to bind when no config file is given
    #[argh(option, short = 'b', default = "\"0.0.0.0:8545\".into()")]
    bind: String,

    /// upstream endpoint URL for the default route; can be repeated
    #[argh(option, short = 'e', long = "endpoint")]
    endpoints: Vec<String>,

    /// consecutive failures before an endpoint is marked unhealthy
    #[argh(option, long = "failure-threshold", default = "3")]
    failure_threshold: u32,

    /// healthy endpoints below which the full pool serves requests
    #[argh(option, long = "min-healthy", default = "1")]
    min_healthy: usize,

    /// path answering GET with 200 OK (e.g. /healthz)
    #[argh(option, long = "health-check-path")]
    health_check_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default log level is INFO; RUST_LOG overrides.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args)?;

    // Unhealthy transitions surface in the logs; external alert
    // delivery wraps this same event contract.
    config.on_endpoint_unhealthy = Some(Arc::new(|event: AlertEvent| {
        tracing::warn!(
            endpoint = %event.endpoint_id,
            url = %event.url,
            route = event.route_id.as_deref().unwrap_or("-"),
            failures = event.consecutive_failures,
            error = event.last_error.as_deref().unwrap_or(""),
            "endpoint unhealthy"
        );
    }));

    let gateway = Gateway::new(config)?;
    gateway.start().await?;
    tracing::info!("gateway started; press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    gateway.stop().await;

    Ok(())
}

fn load_config(args: &ServeArgs) -> Result<GatewayConfig> {
    if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: GatewayConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {path}"))?;
        return Ok(config);
    }

    if args.endpoints.is_empty() {
        return Err(anyhow!(
            "no endpoints configured; use -e <url> or a config file"
        ));
    }
    for url in &args.endpoints {
        validate_http_url(url, "endpoint URL")?;
    }

    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", args.bind))?;

    let mut route = RouteConfig::new(
        "default",
        args.endpoints
            .iter()
            .map(|url| EndpointConfig::new(url.clone()))
            .collect(),
    );
    route.failure_threshold = Some(args.failure_threshold);
    route.min_healthy = Some(args.min_healthy);

    let mut config = GatewayConfig::new(addr.port(), vec![route]);
    config.host = addr.ip().to_string();
    config.health_check_path = args.health_check_path.clone();
    Ok(config)
}
