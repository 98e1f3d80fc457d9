use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use vizcast::api::{ApiRouteSegment, AppState};
use vizcast::{ModelRegistry, VizcastConfig, WeerliveClient, logging, route, web};

/// Visibility and cloud-base forecasts for VFR route planning
#[derive(Debug, Parser)]
#[command(name = "vizcast", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured server port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Predict visibility and cloud base for one location
    Predict {
        /// Place name or "lat,lon"
        location: String,
    },
    /// Evaluate the configured route and print its segments
    Route,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = VizcastConfig::load_from_path(cli.config.clone())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    logging::init(&config.logging)?;

    // Models load once; a missing or corrupt artifact stops the process here.
    let registry = ModelRegistry::load(&config.models).map_err(|e| {
        error!("{}", e);
        e
    })?;

    let waypoints = match &config.route.waypoints_path {
        Some(path) => route::load_waypoints(Path::new(path))
            .with_context(|| format!("Failed to load waypoints from {path}"))?,
        None => route::reference_route(),
    };
    info!("Route has {} waypoints", waypoints.len());

    let provider = WeerliveClient::new(&config.weather)?;
    let state = Arc::new(AppState {
        registry,
        provider: Box::new(provider),
        waypoints,
    });

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&state, &config),
        Command::Predict { location } => {
            let prediction = state.predictor().predict(&location)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
            Ok(())
        }
        Command::Route => {
            let segments = route::evaluate_route(&state.predictor(), &state.waypoints);
            let payload: Vec<ApiRouteSegment> =
                segments.iter().map(ApiRouteSegment::from).collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
    }
}

fn serve(state: &Arc<AppState>, config: &VizcastConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to start async runtime")?;

    // The blocking HTTP client inside `state` must be dropped outside the runtime,
    // so the server only gets a clone of the handle.
    runtime.block_on(web::run(
        state.clone(),
        &config.server.host,
        config.server.port,
        &config.server.static_dir,
    ))
}
