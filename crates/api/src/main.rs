//! Flight Delay API - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "delay-api", version, about = "Serve flight delay predictions over HTTP")]
struct Args {
    /// Config file layered over the defaults (also read from DELAY_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::load(args.config.as_deref()).context("invalid service configuration")?;
    init_logging(config.log_format)?;

    info!("=== Flight Delay API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model_path.display());

    run_server(config).await
}
