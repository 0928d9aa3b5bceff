//! Metro Server
//!
//! Serves the live map, the polling API and the WebSocket push feed over one
//! shared engine.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use metro_occupancy::core::config::AppConfig;
use metro_occupancy::loader::load_engine;
use metro_occupancy::server::{self, AppState};
use metro_occupancy::simulation::SharedEngine;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "metro_server")]
#[command(about = "Live metro occupancy map with polling and WebSocket updates")]
struct Args {
    /// TOML config file ([simulation], [server], [data])
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Network description (JSON), overrides the config
    #[arg(long)]
    network: Option<PathBuf>,

    /// Baseline ridership (JSON), overrides the config
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Seconds between pushed ticks, overrides the config
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metro_occupancy=info,metro_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match AppConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(network) = args.network {
        config.data.network = network;
    }
    if let Some(baseline) = args.baseline {
        config.data.baseline = Some(baseline);
    }
    if let Some(interval) = args.interval {
        config.server.tick_interval_secs = interval;
    }
    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    // No engine, no server: fail before binding
    let engine = match load_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to load network: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(SharedEngine::new(engine), config.server);
    if let Err(e) = server::serve(state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
