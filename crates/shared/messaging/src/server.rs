//! Responding side of the validation channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use domain::VALIDATE_USER_PATTERN;

use crate::broker::MessageBroker;
use crate::contract::{ReplyEnvelope, RequestEnvelope, UserValidationRequest, UserValidationResponse};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Replies nobody collects expire after this long.
const REPLY_TTL: Duration = Duration::from_secs(60);

/// Answers a single validation request.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ValidationHandler: Send + Sync {
    async fn handle(&self, request: UserValidationRequest) -> UserValidationResponse;
}

/// Consumer loop for the shared validation queue.
///
/// Requests are handled concurrently. A handler that panics is answered
/// with an internal error instead of leaving the caller to time out.
pub struct ValidationServer {
    broker: Arc<dyn MessageBroker>,
    queue: String,
    handler: Arc<dyn ValidationHandler>,
    poll_interval: Duration,
}

impl ValidationServer {
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        queue: impl Into<String>,
        handler: Arc<dyn ValidationHandler>,
    ) -> Self {
        Self {
            broker,
            queue: queue.into(),
            handler,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Consume until the process exits.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Consume until `shutdown` resolves. Requests already taken keep running.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!("Validation server consuming {}", self.queue);
        tokio::pin!(shutdown);

        loop {
            let popped = tokio::select! {
                _ = &mut shutdown => break,
                popped = self.broker.pop(&self.queue, self.poll_interval) => popped,
            };

            match popped {
                Ok(Some(payload)) => {
                    tokio::spawn(respond(self.broker.clone(), self.handler.clone(), payload));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to read validation requests: {}", e);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        tracing::info!("Validation server stopped");
    }
}

async fn respond(
    broker: Arc<dyn MessageBroker>,
    handler: Arc<dyn ValidationHandler>,
    payload: String,
) {
    let envelope: RequestEnvelope<serde_json::Value> = match serde_json::from_str(&payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping malformed validation request: {}", e);
            return;
        }
    };

    let response = if envelope.pattern != VALIDATE_USER_PATTERN {
        tracing::warn!("Unknown message pattern: {}", envelope.pattern);
        UserValidationResponse::internal_error()
    } else {
        match serde_json::from_value::<UserValidationRequest>(envelope.data) {
            Ok(request) => {
                let handler_task = tokio::spawn(async move { handler.handle(request).await });
                match handler_task.await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!("Validation handler failed: {}", e);
                        UserValidationResponse::internal_error()
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Validation request without a usable userId: {}", e);
                UserValidationResponse::internal_error()
            }
        }
    };

    let reply = ReplyEnvelope {
        correlation_id: envelope.correlation_id,
        response,
    };
    let payload = match serde_json::to_string(&reply) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to encode validation reply: {}", e);
            return;
        }
    };

    if let Err(e) = broker
        .push_expiring(&envelope.reply_to, payload, REPLY_TTL)
        .await
    {
        tracing::warn!(
            "Failed to deliver validation reply to {}: {}",
            envelope.reply_to,
            e
        );
    }
}
