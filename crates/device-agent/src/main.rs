//! Device Agent
//!
//! Loads the device's component store and routes agent messages received
//! over UDP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use device_agent::connector::LogConnector;
use device_agent::listener::UdpListener;
use device_agent::{AgentConfig, MessageRouter, SensorStore};

/// Device Agent
#[derive(Parser, Debug)]
#[command(name = "device-agent")]
#[command(about = "Local device agent: component store and message routing", long_about = None)]
struct Args {
    /// Path to the agent configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the UDP listener port
    #[arg(long)]
    port: Option<u16>,

    /// Load the store, list its components and exit
    #[arg(long)]
    no_listen: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("device_agent=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting device agent v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AgentConfig::load_or_default(&args.config)
        .await
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?
        .with_env_overrides()?;
    if let Some(dir) = args.data_dir {
        config.data_directory = dir;
    }
    if let Some(port) = args.port {
        config.listener.udp_port = port;
    }

    let store = Arc::new(SensorStore::init(&config.device_store, &config).await);

    if args.no_listen || !config.listener.enabled {
        for component in store.components() {
            info!(
                "  - {} ({}) cid={}",
                self::display(&component.name),
                self::display(&component.kind),
                self::display(&component.cid)
            );
        }
        info!("{} components in {}", store.len(), store.path().display());
        return Ok(());
    }

    let router = MessageRouter::new(store.clone(), Arc::new(LogConnector));
    let listener = UdpListener::bind(config.listener_addr()?, router).await?;
    info!("Listening for agent messages on udp://{}", listener.local_addr()?);

    tokio::select! {
        result = listener.run() => {
            if let Err(e) = result {
                error!("UDP listener stopped: {}", e);
            }
        }
        _ = shutdown_signal() => {}
    }

    if let Err(e) = store.save().await {
        warn!("Failed to save sensor store on shutdown: {}", e);
    }

    info!("Device agent shutdown complete");
    Ok(())
}

fn display(value: &Option<serde_json::Value>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
