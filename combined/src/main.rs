//! Combined binary for development - runs both services in one process.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use messaging::{InMemoryBroker, MessageBroker, RedisBroker};
use order_service_lib::config::OrderServiceConfig;
use user_service_lib::config::UserServiceConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "shop")]
#[command(about = "Combined microservices binary for development")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "3001")]
        user_port: u16,
        #[arg(long, default_value = "3002")]
        order_port: u16,
        /// Queue backing the user validation channel
        #[arg(long, value_enum, default_value_t = QueueKind::Redis)]
        queue: QueueKind,
    },
    /// Run database migrations for both services
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum QueueKind {
    /// Shared Redis lists, as in production
    Redis,
    /// In-process queues, no Redis required
    Memory,
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateAction> for common::MigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => common::MigrateAction::Up,
            MigrateAction::Down => common::MigrateAction::Down,
            MigrateAction::Status => common::MigrateAction::Status,
            MigrateAction::Fresh => common::MigrateAction::Fresh,
        }
    }
}

/// One broker per consumer for Redis, since a blocking pop holds its
/// connection. The in-memory broker is shared so both sides see its queues.
async fn brokers(
    kind: QueueKind,
    users: &UserServiceConfig,
    orders: &OrderServiceConfig,
) -> Result<(Arc<dyn MessageBroker>, Arc<dyn MessageBroker>), BoxError> {
    match kind {
        QueueKind::Redis => {
            let user_broker: Arc<dyn MessageBroker> =
                Arc::new(RedisBroker::connect(&users.queue.url).await?);
            let order_broker: Arc<dyn MessageBroker> =
                Arc::new(RedisBroker::connect(&orders.queue.url).await?);
            Ok((user_broker, order_broker))
        }
        QueueKind::Memory => {
            let broker: Arc<dyn MessageBroker> = Arc::new(InMemoryBroker::new());
            Ok((broker.clone(), broker))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            user_port,
            order_port,
            queue,
        } => {
            let user_config = UserServiceConfig::from_env()?;
            let order_config = OrderServiceConfig::from_env()?;
            let (user_broker, order_broker) = brokers(queue, &user_config, &order_config).await?;

            info!("Starting combined services in development mode ({:?} queue)", queue);
            info!("  User service:  http://{}:{}", host, user_port);
            info!("  Order service: http://{}:{}", host, order_port);

            let user_host = host.clone();
            let user_handle = tokio::spawn(async move {
                if let Err(e) =
                    user_service_lib::run_with_broker(&user_host, user_port, user_config, user_broker)
                        .await
                {
                    error!("User service failed: {}", e);
                }
            });

            let order_handle = tokio::spawn(async move {
                if let Err(e) = order_service_lib::run_with_broker(
                    &host,
                    order_port,
                    order_config,
                    order_broker,
                )
                .await
                {
                    error!("Order service failed: {}", e);
                }
            });

            // Either service exiting ends the process
            tokio::select! {
                _ = user_handle => {
                    info!("User service stopped");
                }
                _ = order_handle => {
                    info!("Order service stopped");
                }
            }
        }
        Commands::Migrate { action } => {
            user_service_lib::run_migrations(action.into()).await?;
            order_service_lib::run_migrations(action.into()).await?;
        }
    }

    Ok(())
}
