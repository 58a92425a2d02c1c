mod core;
mod features;
mod modules;
mod proto;
mod shared;

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::{database, server};
use crate::modules::storage::{Storage, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!(
        "Database connection pool created: {}:{}/{} (max_connections={})",
        config.database.host,
        config.database.port,
        config.database.database,
        config.database.max_connections
    );

    let storage: Arc<dyn Storage> = Arc::new(Store::new(pool));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;
    let listener = server::bind_listener(socket_addr)?;
    tracing::info!("gRPC server listening on {}", addr);

    let result = server::serve(listener, Arc::clone(&storage), server::shutdown_signal()).await;

    storage.close().await;
    result?;

    tracing::info!("Server stopped");
    Ok(())
}
