//! Durable queue abstraction and its Redis implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use thiserror::Error;
use tokio::sync::Mutex;

/// Broker errors
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Queue error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Broker closed")]
    Closed,
}

pub type BrokerResult<T> = Result<T, BrokerError>;

/// FIFO queues of opaque string payloads.
///
/// Each message popped from a queue is delivered to exactly one consumer.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Append a message to the tail of `queue`.
    async fn push(&self, queue: &str, payload: String) -> BrokerResult<()>;

    /// Append a message to a queue that should disappear if nobody drains it.
    async fn push_expiring(&self, queue: &str, payload: String, _ttl: Duration) -> BrokerResult<()> {
        self.push(queue, payload).await
    }

    /// Take the head of `queue`, waiting at most `wait` for one to arrive.
    async fn pop(&self, queue: &str, wait: Duration) -> BrokerResult<Option<String>>;
}

/// Redis list backed broker (`LPUSH` / `BRPOP`).
///
/// Pushes go through a shared [`ConnectionManager`]. Blocking pops hold a
/// dedicated connection, so pops on the same broker run one at a time; give
/// every consumer loop its own broker.
pub struct RedisBroker {
    conn: ConnectionManager,
    blocking: Mutex<MultiplexedConnection>,
}

impl RedisBroker {
    /// Connect both the shared and the blocking connection.
    pub async fn connect(url: &str) -> BrokerResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client.clone()).await?;
        let blocking = client.get_multiplexed_async_connection().await?;

        tracing::info!("Connected to Redis queue broker");

        Ok(Self {
            conn,
            blocking: Mutex::new(blocking),
        })
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn push(&self, queue: &str, payload: String) -> BrokerResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("LPUSH")
            .arg(queue)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn push_expiring(&self, queue: &str, payload: String, ttl: Duration) -> BrokerResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("LPUSH")
            .arg(queue)
            .arg(payload)
            .ignore()
            .cmd("EXPIRE")
            .arg(queue)
            .arg(ttl.as_secs().max(1))
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn pop(&self, queue: &str, wait: Duration) -> BrokerResult<Option<String>> {
        let mut conn = self.blocking.lock().await;
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(queue)
            .arg(wait.as_secs_f64())
            .query_async(&mut *conn)
            .await?;
        Ok(popped.map(|(_, payload)| payload))
    }
}
