//! Order Service Library
//!
//! Places orders and moves them through their status lifecycle. Users are
//! never read from a local table: every use case asks the user service over
//! the validation queue. It can be run as a standalone service or embedded
//! in the combined binary.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use common::MigrateAction;
use messaging::{
    MessageBroker, RedisBroker, ValidationClient, ValidationClientOptions, ValidationTransport,
};

use crate::api::{create_router, AppState};
use crate::config::OrderServiceConfig;
use crate::infra::Database;
use crate::repository::OrderStore;
use crate::service::OrderManager;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the order service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), BoxError> {
    let config = OrderServiceConfig::from_env()?;
    let broker = Arc::new(RedisBroker::connect(&config.queue.url).await?);
    run_with_broker(host, port, config, broker).await
}

/// Run the HTTP API until Ctrl-C, then close the validation client.
pub async fn run_with_broker(
    host: &str,
    port: u16,
    config: OrderServiceConfig,
    broker: Arc<dyn MessageBroker>,
) -> Result<(), BoxError> {
    let db = Arc::new(Database::connect(&config.database).await?);

    let validation = Arc::new(ValidationClient::start(
        broker,
        ValidationClientOptions::new(
            config.queue.validation_queue.clone(),
            Duration::from_millis(config.queue.validation_timeout_ms),
        ),
    ));

    let order_service = Arc::new(
        OrderManager::new(Arc::new(OrderStore::new(db.get_connection())), validation.clone())
            .with_enrichment_concurrency(config.enrichment_concurrency),
    );

    let state = AppState::new(order_service, config.jwt, Some(db));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Order service listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    validation.close().await;
    served?;
    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), BoxError> {
    let db = Database::connect_without_migrations(&OrderServiceConfig::database_from_env()).await?;
    db.apply(action).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
