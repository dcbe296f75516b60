//! Requesting side of the validation channel.
//!
//! Every client owns a private reply queue and a table of in-flight
//! requests keyed by correlation ID. A background listener drains the reply
//! queue and completes the matching entry. Each entry is completed at most
//! once; replies for unknown or already-finished IDs are discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use domain::{DEFAULT_VALIDATION_TIMEOUT_MS, USER_VALIDATION_QUEUE};

use crate::broker::MessageBroker;
use crate::contract::{ReplyEnvelope, RequestEnvelope, UserValidationResponse, REPLY_QUEUE_PREFIX};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Validation round trip as seen by the order side.
///
/// Never fails: transport problems come back as an invalid response.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ValidationTransport: Send + Sync {
    /// Ask whether `user_id` names an existing user.
    async fn request_validation(&self, user_id: Uuid) -> UserValidationResponse;

    /// Stop accepting requests and resolve everything still in flight.
    async fn close(&self);
}

#[derive(Debug, Clone)]
pub struct ValidationClientOptions {
    /// Shared request queue
    pub queue: String,
    /// Upper bound on one round trip
    pub timeout: Duration,
    /// How long the listener blocks on the reply queue per poll
    pub poll_interval: Duration,
}

impl ValidationClientOptions {
    pub fn new(queue: impl Into<String>, timeout: Duration) -> Self {
        Self {
            queue: queue.into(),
            timeout,
            ..Self::default()
        }
    }
}

impl Default for ValidationClientOptions {
    fn default() -> Self {
        Self {
            queue: USER_VALIDATION_QUEUE.to_string(),
            timeout: Duration::from_millis(DEFAULT_VALIDATION_TIMEOUT_MS),
            poll_interval: Duration::from_secs(1),
        }
    }
}

type PendingTable = Arc<Mutex<HashMap<Uuid, oneshot::Sender<UserValidationResponse>>>>;

fn lock(pending: &PendingTable) -> std::sync::MutexGuard<'_, HashMap<Uuid, oneshot::Sender<UserValidationResponse>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes its entry when the waiting call finishes or is dropped.
struct PendingGuard<'a> {
    pending: &'a PendingTable,
    correlation_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.correlation_id);
    }
}

/// Queue-backed [`ValidationTransport`].
pub struct ValidationClient {
    broker: Arc<dyn MessageBroker>,
    queue: String,
    reply_to: String,
    timeout: Duration,
    pending: PendingTable,
    shutdown: watch::Sender<bool>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ValidationClient {
    /// Create the client and spawn its reply listener.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(broker: Arc<dyn MessageBroker>, options: ValidationClientOptions) -> Self {
        let reply_to = format!("{}{}", REPLY_QUEUE_PREFIX, Uuid::new_v4());
        let pending = PendingTable::default();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let listener = tokio::spawn(listen_for_replies(
            broker.clone(),
            reply_to.clone(),
            pending.clone(),
            shutdown_rx,
            options.poll_interval,
        ));

        tracing::info!(
            "Validation client started (queue: {}, reply queue: {})",
            options.queue,
            reply_to
        );

        Self {
            broker,
            queue: options.queue,
            reply_to,
            timeout: options.timeout,
            pending,
            shutdown,
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Private queue replies are addressed to
    pub fn reply_queue(&self) -> &str {
        &self.reply_to
    }

    /// Number of requests awaiting a reply
    pub fn pending_requests(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }
}

#[async_trait]
impl ValidationTransport for ValidationClient {
    async fn request_validation(&self, user_id: Uuid) -> UserValidationResponse {
        let correlation_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        {
            // Checked under the table lock so `close` either sees this entry
            // when it clears the table or this call sees the closed flag.
            let mut pending = lock(&self.pending);
            if self.is_closed() {
                return UserValidationResponse::unavailable();
            }
            pending.insert(correlation_id, tx);
        }
        let _guard = PendingGuard {
            pending: &self.pending,
            correlation_id,
        };

        let envelope = RequestEnvelope::validate_user(correlation_id, &self.reply_to, user_id);
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode validation request: {}", e);
                return UserValidationResponse::unavailable();
            }
        };

        if let Err(e) = self.broker.push(&self.queue, payload).await {
            tracing::warn!("Failed to publish validation request for {}: {}", user_id, e);
            return UserValidationResponse::unavailable();
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                tracing::debug!("Validation request {} dropped on close", correlation_id);
                UserValidationResponse::unavailable()
            }
            Err(_) => {
                tracing::warn!(
                    "Validation of user {} timed out after {:?}",
                    user_id,
                    self.timeout
                );
                UserValidationResponse::unavailable()
            }
        }
    }

    async fn close(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }

        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            if let Err(e) = listener.await {
                tracing::warn!("Reply listener ended abnormally: {}", e);
            }
        }

        // Dropping the senders resolves every waiting call as unavailable.
        lock(&self.pending).clear();
        tracing::info!("Validation client closed");
    }
}

impl Drop for ValidationClient {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.abort();
        }
    }
}

async fn listen_for_replies(
    broker: Arc<dyn MessageBroker>,
    reply_to: String,
    pending: PendingTable,
    mut shutdown: watch::Receiver<bool>,
    poll_interval: Duration,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let popped = tokio::select! {
            _ = shutdown.changed() => break,
            popped = broker.pop(&reply_to, poll_interval) => popped,
        };

        match popped {
            Ok(Some(payload)) => dispatch_reply(&pending, &payload),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to read validation replies: {}", e);
                tokio::time::sleep(poll_interval).await;
            }
        }
    }

    tracing::debug!("Reply listener for {} stopped", reply_to);
}

fn dispatch_reply(pending: &PendingTable, payload: &str) {
    let reply: ReplyEnvelope = match serde_json::from_str(payload) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Discarding malformed validation reply: {}", e);
            return;
        }
    };

    let waiter = lock(pending).remove(&reply.correlation_id);
    match waiter {
        Some(tx) => {
            // The caller may have timed out between lookup and send.
            let _ = tx.send(reply.response);
        }
        None => {
            tracing::debug!(
                "Discarding late or duplicate reply for {}",
                reply.correlation_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{BrokerError, BrokerResult};
    use crate::memory::InMemoryBroker;
    use domain::{UserProfile, UserRole};

    fn options(timeout_ms: u64) -> ValidationClientOptions {
        ValidationClientOptions {
            queue: "validation".to_string(),
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(20),
        }
    }

    fn profile(id: Uuid) -> UserProfile {
        UserProfile {
            id,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            role: UserRole::User,
        }
    }

    async fn take_request(broker: &InMemoryBroker) -> RequestEnvelope {
        let payload = broker
            .pop("validation", Duration::from_secs(1))
            .await
            .unwrap()
            .expect("request published");
        serde_json::from_str(&payload).unwrap()
    }

    async fn reply(broker: &InMemoryBroker, request: &RequestEnvelope, response: UserValidationResponse) {
        let envelope = ReplyEnvelope {
            correlation_id: request.correlation_id,
            response,
        };
        broker
            .push(&request.reply_to, serde_json::to_string(&envelope).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reply_completes_matching_request() {
        let broker = InMemoryBroker::new();
        let client = Arc::new(ValidationClient::start(Arc::new(broker.clone()), options(1000)));
        let user_id = Uuid::new_v4();

        let caller = {
            let client = client.clone();
            tokio::spawn(async move { client.request_validation(user_id).await })
        };

        let request = take_request(&broker).await;
        assert_eq!(request.pattern, "validate_user");
        assert_eq!(request.data.user_id, user_id.to_string());
        assert_eq!(request.reply_to, client.reply_queue());

        reply(&broker, &request, UserValidationResponse::valid(profile(user_id))).await;

        let response = caller.await.unwrap();
        assert!(response.is_valid);
        assert_eq!(response.user.unwrap().id, user_id);
        assert_eq!(client.pending_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_invalid_and_evicts() {
        let broker = InMemoryBroker::new();
        let client = ValidationClient::start(Arc::new(broker.clone()), options(5000));

        let response = client.request_validation(Uuid::new_v4()).await;

        assert!(!response.is_valid);
        assert_eq!(response.error.as_deref(), Some("user validation failed"));
        assert_eq!(client.pending_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reply_is_discarded() {
        let broker = InMemoryBroker::new();
        let client = ValidationClient::start(Arc::new(broker.clone()), options(100));

        let response = client.request_validation(Uuid::new_v4()).await;
        assert!(!response.is_valid);

        let request = take_request(&broker).await;
        reply(&broker, &request, UserValidationResponse::valid(profile(Uuid::new_v4()))).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(client.pending_requests(), 0);
        // The channel keeps working for the next caller.
        let user_id = Uuid::new_v4();
        let client = Arc::new(client);
        let caller = {
            let client = client.clone();
            tokio::spawn(async move { client.request_validation(user_id).await })
        };
        let request = take_request(&broker).await;
        reply(&broker, &request, UserValidationResponse::not_found()).await;
        assert_eq!(caller.await.unwrap(), UserValidationResponse::not_found());
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_correlated() {
        let broker = InMemoryBroker::new();
        let client = Arc::new(ValidationClient::start(Arc::new(broker.clone()), options(1000)));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let callers: Vec<_> = [first, second]
            .into_iter()
            .map(|id| {
                let client = client.clone();
                tokio::spawn(async move { client.request_validation(id).await })
            })
            .collect();

        let a = take_request(&broker).await;
        let b = take_request(&broker).await;
        // Answer out of order.
        for request in [&b, &a] {
            let id: Uuid = request.data.user_id.parse().unwrap();
            reply(&broker, request, UserValidationResponse::valid(profile(id))).await;
        }

        let mut resolved = Vec::new();
        for caller in callers {
            resolved.push(caller.await.unwrap().user.unwrap().id);
        }
        assert_eq!(resolved, vec![first, second]);
    }

    #[tokio::test]
    async fn test_close_resolves_pending_as_invalid() {
        let broker = InMemoryBroker::new();
        let client = Arc::new(ValidationClient::start(Arc::new(broker.clone()), options(60_000)));

        let caller = {
            let client = client.clone();
            tokio::spawn(async move { client.request_validation(Uuid::new_v4()).await })
        };
        let _ = take_request(&broker).await;

        client.close().await;
        let response = caller.await.unwrap();
        assert!(!response.is_valid);
        assert!(client.is_closed());

        let after_close = client.request_validation(Uuid::new_v4()).await;
        assert_eq!(after_close, UserValidationResponse::unavailable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_racing_close_do_not_wait_out_timeout() {
        let broker = InMemoryBroker::new();
        let client = Arc::new(ValidationClient::start(Arc::new(broker.clone()), options(60_000)));
        let started = tokio::time::Instant::now();

        let callers: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.request_validation(Uuid::new_v4()).await })
            })
            .collect();
        let closer = {
            let client = client.clone();
            tokio::spawn(async move { client.close().await })
        };

        for caller in callers {
            assert_eq!(caller.await.unwrap(), UserValidationResponse::unavailable());
        }
        closer.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(client.pending_requests(), 0);
    }

    struct DownBroker;

    #[async_trait]
    impl MessageBroker for DownBroker {
        async fn push(&self, _queue: &str, _payload: String) -> BrokerResult<()> {
            Err(BrokerError::Closed)
        }

        async fn pop(&self, _queue: &str, wait: Duration) -> BrokerResult<Option<String>> {
            tokio::time::sleep(wait).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_publish_failure_returns_invalid() {
        let client = ValidationClient::start(Arc::new(DownBroker), options(1000));
        let response = client.request_validation(Uuid::new_v4()).await;

        assert_eq!(response, UserValidationResponse::unavailable());
        assert_eq!(client.pending_requests(), 0);
    }
}
