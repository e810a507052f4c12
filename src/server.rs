//! Tracing setup and the long-running server.

use std::sync::{Arc, OnceLock};

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrapehub_api::{AppState, InterfaceConfig, InterfaceServer};
use scrapehub_config::{Config, LoggingConfig};

use crate::wiring;

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console output and, if enabled, a daily
/// rotated log file.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if logging.file {
        let log_dir = logging.log_dir();
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("scrapehub")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);
        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Run the reconciliation loop and HTTP API until a shutdown signal.
pub(crate) async fn run_server(
    config: Config,
    host: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting ScrapeHub v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Timezone {}, poll interval {}",
        config.scheduler.timezone, config.scheduler.poll_interval
    );

    let hub = wiring::build_hub(&config).await?;

    let cancel = CancellationToken::new();
    let reconcile_task = hub
        .reconciliation_loop(config.scheduler.poll_interval.as_duration())
        .spawn(cancel.clone());

    let server = InterfaceServer::new(
        InterfaceConfig::new(host, port),
        AppState::new(Arc::clone(&hub)),
    );

    let stop = cancel.clone();
    let stop_hub = Arc::clone(&hub);
    let served = server
        .run_until(async move {
            shutdown_signal().await;
            stop.cancel();
            stop_hub.shutdown();
        })
        .await;

    // Also reached when the server fails to start.
    cancel.cancel();
    if let Err(e) = reconcile_task.await {
        warn!("Reconciliation loop ended abnormally: {}", e);
    }
    hub.shutdown();

    info!("ScrapeHub stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
