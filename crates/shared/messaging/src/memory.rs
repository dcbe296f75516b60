//! In-process broker for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::broker::{BrokerError, BrokerResult, MessageBroker};

struct Queue {
    tx: mpsc::UnboundedSender<String>,
    rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<String>>>,
}

impl Queue {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(AsyncMutex::new(rx)),
        }
    }
}

/// Broker keeping every queue in memory. Clones share the same queues.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    queues: Arc<Mutex<HashMap<String, Queue>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_queue<R>(&self, name: &str, f: impl FnOnce(&Queue) -> R) -> R {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = queues.entry(name.to_string()).or_insert_with(Queue::new);
        f(queue)
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn push(&self, queue: &str, payload: String) -> BrokerResult<()> {
        self.with_queue(queue, |q| q.tx.send(payload))
            .map_err(|_| BrokerError::Closed)
    }

    async fn pop(&self, queue: &str, wait: Duration) -> BrokerResult<Option<String>> {
        let rx = self.with_queue(queue, |q| q.rx.clone());
        let mut rx = rx.lock().await;

        match tokio::time::timeout(wait, rx.recv()).await {
            Ok(Some(payload)) => Ok(Some(payload)),
            Ok(None) => Err(BrokerError::Closed),
            Err(_) => Ok(None),
        }
    }
}
