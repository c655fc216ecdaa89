//! Edge Gateway
//!
//! A reverse-proxy gateway that fronts a multi-tenant backend API and a
//! handful of third-party collectors, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                   EDGE GATEWAY                   │
//!                        │                                                  │
//!     Browser Request    │  ┌─────────┐    ┌──────────┐    ┌────────────┐  │
//!     ───────────────────┼─▶│  http   │───▶│ dispatch │───▶│   proxy    │──┼──▶ Backend API /
//!                        │  │ server  │    │ (prefix) │    │  handler   │  │    collectors
//!                        │  └─────────┘    └────┬─────┘    └─────┬──────┘  │
//!                        │                      │                │         │
//!                        │                      ▼                ▼         │
//!                        │               ┌────────────┐   ┌────────────┐   │
//!                        │               │    auth    │   │   relay    │   │
//!                        │               │  cookies,  │   │ analytics, │   │
//!                        │               │  refresh   │   │   sentry   │   │
//!                        │               └────────────┘   └────────────┘   │
//!                        │                                                 │
//!                        │  ┌───────────────────────────────────────────┐  │
//!                        │  │           Cross-Cutting Concerns          │  │
//!                        │  │  ┌────────┐ ┌───────────────┐ ┌─────────┐ │  │
//!                        │  │  │ config │ │ observability │ │lifecycle│ │  │
//!                        │  │  └────────┘ └───────────────┘ └─────────┘ │  │
//!                        │  └───────────────────────────────────────────┘  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edge_gateway::config::{default_config, load_config};
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::observability::metrics;
use edge_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(version, about = "Reverse-proxy gateway for the backend API", long_about = None)]
struct Args {
    /// Path to the TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path),
        None => default_config(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration rejected: {e}");
            process::exit(2);
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "edge_gateway={},tower_http=debug",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("edge-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        tenant = %config.tenant.domain,
        "Configuration loaded"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let bind_address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();

    let server = GatewayServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr = bind_address.parse()?;
            tracing::info!(address = %addr, "Listening with TLS");
            server.run_tls(addr, &tls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(
                address = %listener.local_addr()?,
                "Listening for connections"
            );
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
