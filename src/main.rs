// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use anyhow::Context;
use velib_api::application::batch_service::BatchService;
use velib_api::application::station_service::StationService;
use velib_api::build_router;
use velib_api::infrastructure::config::load_app_config;
use velib_api::infrastructure::mongo_repository::MongoRepository;
use velib_api::infrastructure::telemetry::init_tracing;
use velib_api::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(config.is_production());

    // Connect once; refuse to serve against a store we never reached
    let repository = MongoRepository::connect(
        &config.mongodb_uri,
        &config.mongodb_database,
        config.max_pool_size,
        config.store_timeout(),
    )
    .await
    .context("Failed to connect to MongoDB")?;
    repository.ensure_indexes().await;

    let store = Arc::new(repository.clone());

    // Create services (application layer)
    let station_service = StationService::new(store.clone(), config.store_timeout())
        .with_critical_max_results(config.critical_max_results);
    let batch_service = BatchService::new(store, config.store_timeout());

    // Create application state
    let state = Arc::new(AppState {
        station_service,
        batch_service,
        expose_errors: !config.is_production(),
    });

    let router = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, environment = %config.environment, "Vélib API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    repository.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received, shutting down gracefully"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down gracefully"),
    }
}
