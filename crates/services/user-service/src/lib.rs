//! User Service Library
//!
//! Owns user accounts: registration, login and profiles over HTTP, and
//! answers user validation requests from other services over the queue.
//! It can be run as a standalone service or embedded in the combined binary.

pub mod api;
pub mod config;
pub mod infra;
pub mod queue;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use common::MigrateAction;
use messaging::{MessageBroker, RedisBroker, ValidationServer};

use crate::api::{create_router, AppState};
use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::queue::UserValidationResponder;
use crate::repository::{UserRepository, UserStore};
use crate::service::{AdminBootstrap, Authenticator, UserManager, UserService};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the user service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), BoxError> {
    let config = UserServiceConfig::from_env()?;
    let broker = Arc::new(RedisBroker::connect(&config.queue.url).await?);
    run_with_broker(host, port, config, broker).await
}

/// Run the HTTP API and the validation responder until Ctrl-C.
pub async fn run_with_broker(
    host: &str,
    port: u16,
    config: UserServiceConfig,
    broker: Arc<dyn MessageBroker>,
) -> Result<(), BoxError> {
    let db = Arc::new(Database::connect(&config.database).await?);

    let user_repo: Arc<dyn UserRepository> = Arc::new(UserStore::new(db.get_connection()));
    let user_service = Arc::new(UserManager::new(user_repo.clone()));
    let auth_service = Arc::new(Authenticator::new(user_repo.clone(), config.jwt.clone()));

    let responder = ValidationServer::new(
        broker,
        config.queue.validation_queue.clone(),
        Arc::new(UserValidationResponder::new(user_repo)),
    );
    let responder = tokio::spawn(responder.run_until(shutdown_signal()));

    let state = AppState::new(auth_service, user_service, Some(db));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("User service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    responder.await?;
    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), BoxError> {
    let db = Database::connect_without_migrations(&UserServiceConfig::database_from_env()).await?;
    db.apply(action).await?;
    Ok(())
}

/// Promote or create an ADMIN account (for CLI commands).
pub async fn create_admin(name: String, email: String, password: String) -> Result<(), BoxError> {
    let db = Database::connect(&UserServiceConfig::database_from_env()).await?;
    let users = UserManager::new(Arc::new(UserStore::new(db.get_connection())));

    let (user, outcome) = users.create_admin(name, email, password).await?;
    match outcome {
        AdminBootstrap::Created => info!("Created ADMIN account {} ({})", user.email, user.id),
        AdminBootstrap::Promoted => info!("{} ({}) is now an ADMIN", user.email, user.id),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
