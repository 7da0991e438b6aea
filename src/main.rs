use anyhow::{Context, Result};
use car_insurance::core::seed::seed_demo_data;
use car_insurance::utils::{logger, validation::Validate};
use car_insurance::{
    build_router, CliConfig, ExpirationPoller, InsuranceStore, MemoryStore, RecordService,
    SqliteStore, StorageKind, TomlConfig,
};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn load_config() -> Result<CliConfig> {
    let mut config = CliConfig::parse();

    if let Some(path) = config.config.clone() {
        let file = TomlConfig::from_file(&path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        file.validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.merge_file(&file);
    }

    Ok(config)
}

fn open_store(config: &CliConfig) -> Result<Arc<dyn InsuranceStore>> {
    let store: Arc<dyn InsuranceStore> = match config.storage {
        StorageKind::Memory => Arc::new(MemoryStore::new()),
        StorageKind::Sqlite if config.database == ":memory:" => {
            Arc::new(SqliteStore::open_in_memory()?)
        }
        StorageKind::Sqlite => Arc::new(SqliteStore::open(&config.database)?),
    };
    Ok(store)
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown requested");
    cancel.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting car-insurance service");
    if config.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = open_store(&config).context("failed to open storage")?;
    tracing::info!("Storage ready ({:?}, {})", config.storage, config.database);

    if config.seed_demo_data {
        seed_demo_data(store.as_ref())
            .await
            .context("failed to seed demo data")?;
    }

    let cancel = CancellationToken::new();

    let poller_handle = if config.disable_poller {
        tracing::info!("Expiration poller disabled");
        None
    } else {
        let mut poller =
            ExpirationPoller::new(Arc::clone(&store)).with_interval(config.check_interval());
        let token = cancel.clone();
        Some(tokio::spawn(async move { poller.run(token).await }))
    };

    let app = build_router(RecordService::new(store));
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .context("HTTP server failed")?;

    cancel.cancel();
    if let Some(handle) = poller_handle {
        if let Err(e) = handle.await {
            tracing::error!("Expiration poller task failed: {}", e);
        }
    }

    tracing::info!("Service stopped");
    Ok(())
}
