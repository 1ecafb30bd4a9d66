// promptcache - Caching HTTP facade for a text-generation engine
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use promptcache::cache::CacheManager;
use promptcache::cli::Args;
use promptcache::config::AppConfig;
use promptcache::engine::HttpEngine;
use promptcache::metrics::{MetricsRecorder, SystemSampler};
use promptcache::server::create_router;
use promptcache::service::{GenerationService, GenerationSettings};
use promptcache::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting promptcache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Shared services, which must exist before traffic is accepted
    let sampler = SystemSampler::spawn(Duration::from_millis(config.performance.sampler_interval_ms));
    let cache = Arc::new(CacheManager::from_config(&config.cache)?);
    let recorder = Arc::new(MetricsRecorder::new(sampler));

    // Phase 4: Inference engine
    info!("Using inference engine at {}", config.engine.endpoint);
    let engine = Arc::new(HttpEngine::new(&config.engine)?);

    let service = Arc::new(GenerationService::new(
        cache,
        recorder,
        engine,
        GenerationSettings::from_config(&config),
    ));

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config, service)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
