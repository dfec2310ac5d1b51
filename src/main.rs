//! Telegrid Server
//!
//! Command-line entry point for the meter telemetry console.

use clap::Parser;
use std::path::PathBuf;

use telegrid::api::{serve, AppState};
use telegrid::config::{self, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Meter telemetry console
#[derive(Parser, Debug)]
#[command(name = "telegrid", version, about)]
struct Args {
    /// Path to a TOML config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    /// Print a default config file and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_logging(&config);

    tracing::info!("Starting Telegrid v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Metering backend: {}", config.upstream.base_url);
    if !config.api.require_auth {
        tracing::warn!("Authentication is disabled");
    }

    let state = AppState::new(config)?;

    match state.upstream.health_check().await {
        Ok(_) => tracing::info!("Metering backend connection verified"),
        Err(e) => tracing::warn!("Metering backend not available: {} (reports will fail until it is)", e),
    }

    serve(state).await?;

    tracing::info!("Telegrid stopped");
    Ok(())
}

/// Initialize tracing from the logging config; RUST_LOG wins when set
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("telegrid={},tower_http=info", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
