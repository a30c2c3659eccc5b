use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use supplier_service::{
    build_router,
    config::SupplierConfig,
    services::{
        metrics::init_metrics, Database, HttpScreeningClient, InMemoryStore, SupplierStore,
        UserStore,
    },
    AppState,
};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = SupplierConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting supplier service"
    );

    let (suppliers, users): (Arc<dyn SupplierStore>, Arc<dyn UserStore>) =
        if config.database.url.expose_secret().trim().is_empty() {
            tracing::warn!("DATABASE_URL is not set; using the in-memory store");
            let store = InMemoryStore::new();
            (Arc::new(store.clone()), Arc::new(store))
        } else {
            let db = Database::new(
                &config.database.url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await?;
            db.run_migrations().await?;
            (Arc::new(db.clone()), Arc::new(db))
        };

    let screening = Arc::new(HttpScreeningClient::new(&config.scraping_service)?);
    tracing::info!(base_url = %config.scraping_service.base_url, "Scraping client initialized");

    let state = AppState::new(config.clone(), suppliers, users, screening);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
