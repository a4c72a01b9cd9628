//! covdash-web - EU COVID-19 increase dashboard
//!
//! Loads the case/death reports once (CSV export or statistics API), then
//! serves the dashboard UI and its JSON views.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use covdash_common::config::{load_config, ConfigOverrides};
use covdash_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for covdash-web
#[derive(Parser, Debug)]
#[command(name = "covdash-web")]
#[command(about = "EU COVID-19 increase dashboard")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load reports from this CSV export
    #[arg(long, conflicts_with = "api")]
    csv: Option<PathBuf>,

    /// Load reports from the statistics API
    #[arg(long)]
    api: bool,

    /// Statistics API key
    #[arg(long, env = "COVDASH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Address to listen on
    #[arg(short, long, env = "COVDASH_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covdash_web=info,covdash_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow source loading
    info!(
        "Starting covdash-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let overrides = ConfigOverrides {
        csv: args.csv,
        api: args.api,
        api_key: args.api_key,
        bind_addr: args.bind,
    };
    let config = load_config(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;
    info!(source = %config.source.describe(), "Data source");

    let dataset = config
        .source
        .load(config.reference_date)
        .await
        .with_context(|| format!("Failed to load reports from {}", config.source.describe()))?;

    if dataset.is_empty() {
        warn!(source = %config.source.describe(), "Dataset has no province records");
    }

    if dataset.missing.is_complete() {
        info!("No missing data found");
    } else {
        info!(
            missing = dataset.missing.total_missing,
            "Dataset has missing values, see /api/quality"
        );
    }

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(dataset, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("covdash-web listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
