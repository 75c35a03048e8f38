//! `wayfinder` server binary.
//!
//! Loads a TOML route config and serves route resolution over HTTP:
//! matched routes answer with a JSON summary, guard and fallback redirects
//! answer with 3xx.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use wayfinder::config::{load_config, RouterConfig};
use wayfinder::observability::init_logging;
use wayfinder::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "wayfinder", version, about = "Route resolution server")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    init_logging(&config.observability.log_level);

    tracing::info!("wayfinder v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        routes = config.routes.len(),
        base = config.base.as_deref().unwrap_or("<from request>"),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
