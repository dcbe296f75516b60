//! Request/reply user validation over a durable message queue.
//!
//! The order service asks "is this user valid, and who are they?" and the
//! user service answers. Both sides speak the envelopes in [`contract`]
//! through a [`MessageBroker`]:
//!
//! - [`ValidationClient`] publishes requests and correlates replies
//! - [`ValidationServer`] consumes requests and dispatches them to a
//!   [`ValidationHandler`]

pub mod broker;
pub mod client;
pub mod contract;
pub mod memory;
pub mod server;

pub use broker::{BrokerError, BrokerResult, MessageBroker, RedisBroker};
pub use client::{ValidationClient, ValidationClientOptions, ValidationTransport};
pub use contract::{ReplyEnvelope, RequestEnvelope, UserValidationRequest, UserValidationResponse};
pub use memory::InMemoryBroker;
pub use server::{ValidationHandler, ValidationServer};

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockValidationTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use server::MockValidationHandler;
