//! Presence Relay Server
//!
//! Main entry point: connects to the chat gateway, keeps the latest
//! presence per user, and serves it over REST and a live event stream.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use presence_core::config::AppConfig;
use presence_core::error::AppError;
use presence_gateway::GatewayClient;
use presence_realtime::{PresenceEngine, PresenceSource};

/// Relays chat-platform presence to HTTP clients.
#[derive(Debug, Parser)]
#[command(name = "presence-server", version, about)]
struct Cli {
    /// Base configuration file [env: PRESENCE_CONFIG]
    #[arg(short, long)]
    config: Option<String>,

    /// Environment overlay loaded from `config/<env>.toml` [env: PRESENCE_ENV]
    #[arg(short, long)]
    env: Option<String>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load and validate configuration from file, environment and CLI flags.
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("PRESENCE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("PRESENCE_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let mut config = AppConfig::load(&config_path, &env)?;

    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting presence relay");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("TLS crypto provider already installed");
    }

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();

    // ── Step 1: Presence engine + ingest task ────────────────────
    let engine = PresenceEngine::new(config.realtime.clone(), &config.normalizer);
    let (events, ingest) = engine.spawn_ingest(shutdown.clone());

    // ── Step 2: Gateway connection ───────────────────────────────
    let mut gateway = GatewayClient::new(config.gateway.clone());
    let gateway_shutdown = shutdown.clone();
    let gateway_task = tokio::spawn(async move {
        let result = gateway.run(events, gateway_shutdown.clone()).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Gateway client stopped");
        }
        // Without an upstream there is nothing left to relay.
        gateway_shutdown.cancel();
        result
    });

    // ── Step 3: Signal handling ──────────────────────────────────
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
                tracing::info!("Shutdown signal received");
            }
            _ = signal_shutdown.cancelled() => {}
        }
        signal_shutdown.cancel();
    });

    // ── Step 4: HTTP server ──────────────────────────────────────
    let served = presence_api::run_server(Arc::clone(&config), engine, shutdown.clone()).await;
    shutdown.cancel();

    let gateway_result = gateway_task
        .await
        .map_err(|e| AppError::internal(format!("Gateway task panicked: {e}")))?;
    if let Err(e) = ingest.await {
        tracing::warn!(error = %e, "Ingest task ended abnormally");
    }

    served?;
    gateway_result?;

    tracing::info!("Presence relay stopped");
    Ok(())
}
