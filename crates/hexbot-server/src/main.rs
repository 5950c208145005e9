#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use hexbot::ColorService;
use server::config::{CliArgs, ServerConfig};
use server::handler::{AppState, router};
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry()?;

    let service = Arc::new(ColorService::new(config.generator.clone())?);
    let app = router(AppState::new(Arc::clone(&service), &config));

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config.server_addr, &config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(service, config))
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &str, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting color service on {addr} with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting color service on {addr} with {} workers",
            config.generator.num_workers
        );
    }
}

/// Resolves once a termination signal arrives.
///
/// In-flight requests get `shutdown_timeout` to drain; after that the
/// service token is cancelled and every pipeline still running stops at its
/// next color, returning what it has.
async fn shutdown_signal(service: Arc<ColorService>, config: ServerConfig) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!(
        "Shutdown signal received, draining for up to {:?}",
        config.shutdown_timeout
    );

    // 1. Stop accepting connections and let in-flight requests drain.
    // 2. Cancel whatever is still generating once the drain window closes.
    let timeout = config.shutdown_timeout;
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        service.shutdown();
    });
}
