//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Users and orders are shared between the user and order services, and the
//! order status machine lives here so both the orchestrator and its tests
//! can use it without any I/O.

pub mod constants;
pub mod error;
pub mod order;
pub mod order_status;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult, OrderError, OrderResult};
pub use order::{
    compute_total, is_whole_cents, max_money_amount, validate_items, NewOrderItem, Order,
    OrderItem, OrderStatus,
};
pub use order_status::{check_transition, DenyReason, Transition};
pub use password::Password;
pub use user::{User, UserProfile, UserResponse, UserRole};
