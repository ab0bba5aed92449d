//! Baropot backend
//!
//! Main application entry point

use std::time::Duration;

use anyhow::Context;
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info};

use baropot::{
    build_router,
    config::Settings,
    database::{create_pool, run_migrations},
    utils::logging,
    AppState, ServiceFactory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", baropot::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;

    // Initialize services
    let services = ServiceFactory::new(&settings, pool);

    // Background jobs
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = tokio::spawn(services.reservation_service.clone().run_completion_sweep(
        Duration::from_secs(settings.scheduler.reservation_sweep_interval_secs),
        shutdown_rx,
    ));

    let app = build_router(AppState::new(services), &settings.server.cors_origins);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, "Baropot backend is ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Stopping background jobs...");
    if shutdown_tx.send(true).is_err() {
        error!("Reservation sweep exited before shutdown");
    }
    if let Err(e) = sweep.await {
        error!(error = %e, "Reservation sweep task panicked");
    }

    info!("Baropot backend has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
