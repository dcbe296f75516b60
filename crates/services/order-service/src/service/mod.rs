//! Service layer - order use cases.

mod order_service;

pub use order_service::{EnrichedOrder, OrderManager, OrderService};
