// Job Market Dashboard - Web Server
// REST API + Plotly front-end with Axum

use anyhow::{Context, Result};
use clap::Parser;
use job_market_dashboard::api::{build_router, AppState};
use job_market_dashboard::{sample_records, Config, VERSION};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve the dashboard over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides [server] bind
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", config.general.log_level).into()
            }),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("Job market dashboard server v{}", VERSION);

    let bind = config.server.bind.clone();
    let records = sample_records();
    info!("Serving {} records", records.len());

    let app = build_router(AppState::new(records, config));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on http://{}", bind);
    info!("API endpoints:");
    info!("  GET /api/health");
    info!("  GET /api/pages");
    info!("  GET /api/pages/:slug");
    info!("  GET /api/records");
    info!("  GET /api/filter");
    info!("  GET /api/export");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
