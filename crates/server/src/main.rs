use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jackett_relay_core::{
    load_config, load_config_from_env, validate_config, AdditionalSources, AggregatorSettings,
    CinemetaClient, Config, GatewayClient, HttpReferenceFetcher, ResultAggregator,
    TrackerService,
};
use jackett_relay_server::{api::create_router, state::AppState};

/// Environment variable naming the config file
const CONFIG_ENV: &str = "JACKETT_RELAY_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = read_config()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Gateway hosts: {}", config.gateway.hosts.len());
    info!("Addon name: {}", config.addon.name);

    let gateway = Arc::new(
        GatewayClient::new(config.gateway.clone()).context("Failed to create gateway client")?,
    );

    let catalog_timeout = config
        .catalog
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.search.response_timeout());
    let catalog = Arc::new(
        CinemetaClient::new(config.catalog.base_url.clone(), catalog_timeout)
            .context("Failed to create metadata client")?,
    );

    let fetcher = Arc::new(
        HttpReferenceFetcher::new(config.search.response_timeout())
            .context("Failed to create link fetcher")?,
    );

    // Load trackers before serving, then keep them fresh in the background
    let trackers = Arc::new(
        TrackerService::new(config.trackers.clone()).context("Failed to create tracker service")?,
    );
    trackers.refresh().await;
    let shutdown = CancellationToken::new();
    let refresh_handle = Arc::clone(&trackers).spawn_refresh(shutdown.clone());

    let mut aggregator = ResultAggregator::new(
        AggregatorSettings::from_config(&config),
        gateway,
        catalog,
        fetcher,
        trackers,
    );

    if !config.additional.sources.is_empty() {
        let additional = AdditionalSources::new(
            config.additional.sources.clone(),
            config.addon.name.clone(),
            config.search.response_timeout(),
        )
        .context("Failed to create additional sources client")?;
        info!("Additional sources: {}", additional.sources().len());
        aggregator = aggregator.with_additional_sources(Arc::new(additional));
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(aggregator)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    shutdown.cancel();
    let _ = refresh_handle.await;
    info!("Tracker refresh stopped");

    Ok(())
}

/// Load the config file named by `JACKETT_RELAY_CONFIG`, falling back to
/// `config.toml` when present and to environment variables alone otherwise.
fn read_config() -> Result<Config> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))
            } else {
                info!("No config file, using environment variables");
                load_config_from_env().context("Failed to load config from environment")
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
