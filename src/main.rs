//! Trusted-hosts resolver demo server.
//!
//! Serves an identity-echo endpoint behind the trusted-hosts middleware so
//! the resolution behavior can be exercised end-to-end:
//!
//! ```text
//! Client Request
//!     → net listener (ConnectInfo peer address)
//!     → trusted_hosts middleware (chain walk, URI/attribute rewrite)
//!     → echo handler (reports the resolved identity)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::get,
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use trusted_hosts::config::{load_config, ResolverConfig};
use trusted_hosts::observability::{logging, metrics};
use trusted_hosts::{trusted_hosts_middleware, ForwardedIdentity, TrustedHosts};

#[derive(Parser)]
#[command(name = "trusted-hosts")]
#[command(about = "Trusted-hosts network resolver demo server", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ResolverConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        trust_entries = config.trusted_hosts.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation already proved the address parses.
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let trusted = TrustedHosts::from_config(&config.trusted_hosts)?;

    let app = Router::new()
        .route("/", get(echo_identity))
        .route("/{*path}", get(echo_identity))
        .layer(middleware::from_fn_with_state(
            trusted,
            trusted_hosts_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Reports the identity the middleware resolved for this request.
async fn echo_identity(req: Request<Body>) -> String {
    let uri = req.uri();
    let identity = req.extensions().get::<ForwardedIdentity>();

    let mut lines = vec![
        format!("uri: {uri}"),
        format!("path: {}", uri.path()),
        format!("query: {}", uri.query().unwrap_or_default()),
    ];
    if let Some(identity) = identity {
        lines.push(format!("client_ip: {}", identity.client_ip));
        let mut attributes: Vec<_> = identity.attributes.iter().collect();
        attributes.sort();
        for (name, value) in attributes {
            lines.push(format!("attr.{name}: {value}"));
        }
    }
    lines.join("\n")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
