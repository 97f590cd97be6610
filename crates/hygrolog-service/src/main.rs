//! Hygrolog service - capture loop and HTTP read API.
//!
//! Run with: `cargo run -p hygrolog-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use hygrolog_core::{GitPublisher, LineSource, Publisher, SerialLineSource};
use hygrolog_service::{AppState, Collector, Config, api};
use hygrolog_store::Store;

/// Hygrolog service - serial capture loop and HTTP read API.
#[derive(Parser, Debug)]
#[command(name = "hygrolog-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Data directory (overrides config).
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Serial port (overrides config).
    #[arg(short = 'p', long)]
    port: Option<String>,

    /// Disable the capture loop (API only mode).
    #[arg(long)]
    no_collector: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hygrolog_service=info".parse()?)
                .add_directive("hygrolog_store=info".parse()?)
                .add_directive("hygrolog_core=info".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(port) = args.port {
        config.serial.port = port;
    }

    config.validate()?;

    // Create application state
    let state = AppState::new(config.clone());

    // Start the capture loop
    if args.no_collector {
        info!("Capture loop disabled");
    } else {
        let store = Store::open(&config.storage.data_dir, config.storage.policy())?;

        // An unopenable device degrades the loop to sleep-only instead of
        // aborting the service.
        let source: Option<Box<dyn LineSource>> = match SerialLineSource::open(
            &config.serial.port,
            config.serial.baud,
            config.serial.read_timeout(),
        ) {
            Ok(source) => Some(Box::new(source)),
            Err(e) => {
                warn!("{e}; capture loop will idle");
                None
            }
        };

        let publisher: Option<Box<dyn Publisher>> = if config.sync.enabled {
            config.sync.repo_dir.as_ref().map(|repo_dir| {
                Box::new(GitPublisher::new(
                    repo_dir.clone(),
                    config.sync.remote.clone(),
                    config.sync.branch.clone(),
                )) as Box<dyn Publisher>
            })
        } else {
            None
        };

        let collector = Collector::new(
            Arc::clone(&state),
            store,
            source,
            publisher,
            config.capture.interval(),
        );
        collector.start()?;
    }

    // Build the router
    let app = api::router(&config.storage.data_dir)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse()?;

    info!("Starting server on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
