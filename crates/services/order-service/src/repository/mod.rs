//! Repository layer for data access.

pub mod entities;
mod order_repository;

pub use order_repository::{OrderRepository, OrderStore};

#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
