//! DocVault Server — event-sourced document lifecycle core.
//!
//! Main entry point that wires all crates together and runs the
//! background loops: the scan worker, the saga coordinator, and the
//! document-side erase handler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use docvault_admission::queue::AdmissionQueue;
use docvault_admission::status::StatusTracker;
use docvault_admission::worker::ScanWorker;
use docvault_cache::memory::MemoryProjectionCache;
use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_core::traits::cache::ProjectionCache;
use docvault_core::traits::scanner::VirusScanner;
use docvault_core::traits::storage::BlobStorage;
use docvault_eventstore::log::EventLog;
use docvault_saga::{DocumentEraseHandler, MessageChannel, SagaCoordinator};
use docvault_scan::ClamAvScanner;
use docvault_service::{DocumentService, UserService};
use docvault_storage::local::LocalBlobStorage;

/// How long shutdown waits for the background loops to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
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
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Wire the application together and run until a shutdown signal arrives.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    // Shared state. Every collaborator is passed in by handle; no globals.
    let cache: Arc<dyn ProjectionCache> = Arc::new(MemoryProjectionCache::new(&config.cache));
    let log = Arc::new(EventLog::with_cache(Arc::clone(&cache)));
    let storage: Arc<dyn BlobStorage> =
        Arc::new(LocalBlobStorage::new(&config.storage.data_root).await?);
    let scanner: Arc<dyn VirusScanner> = Arc::new(ClamAvScanner::new(&config.scan));
    let queue = Arc::new(AdmissionQueue::new(config.admission.max_queue_depth));
    let status = Arc::new(StatusTracker::new());
    let channel = Arc::new(MessageChannel::new());

    if !storage.health_check().await? {
        return Err(AppError::storage("Blob storage failed its health check"));
    }

    let coordinator = Arc::new(SagaCoordinator::new(Arc::clone(&channel), &config.saga));
    let erase_handler = Arc::new(DocumentEraseHandler::new(
        Arc::clone(&channel),
        Arc::clone(&log),
        Arc::clone(&storage),
    ));

    let documents = Arc::new(DocumentService::new(
        Arc::clone(&log),
        Arc::clone(&cache),
        Arc::clone(&queue),
        Arc::clone(&status),
        config.storage.max_upload_size_bytes,
    ));
    let users = Arc::new(UserService::new(Arc::clone(&coordinator)));
    tracing::info!(documents = ?documents, users = ?users, "Services initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();

    if config.admission.enabled {
        let worker = ScanWorker::new(
            Arc::clone(&queue),
            Arc::clone(&scanner),
            Arc::clone(&storage),
            Arc::clone(&log),
            Arc::clone(&status),
            config.admission.clone(),
        );
        let rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            worker.run(rx).await;
            Ok(())
        }));
    } else {
        tracing::warn!("Scan worker disabled; uploads will queue without admission");
    }

    {
        let coordinator = Arc::clone(&coordinator);
        let rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move { coordinator.run(rx).await }));
    }
    {
        let handler = Arc::clone(&erase_handler);
        let rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move { handler.run(rx).await }));
    }

    tracing::info!("DocVault started");
    wait_for_shutdown_signal().await;

    tracing::info!("Shutting down");
    shutdown_tx
        .send(true)
        .map_err(|_| AppError::internal("All background tasks exited before shutdown"))?;

    for task in tasks {
        match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Background task ended with error"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Background task panicked"),
            Err(_) => tracing::warn!("Background task did not stop within the grace period"),
        }
    }

    tracing::info!("DocVault stopped");
    Ok(())
}

/// Block until SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
