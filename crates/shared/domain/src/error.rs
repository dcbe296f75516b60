//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, queue, database).

use thiserror::Error;

use crate::order::OrderStatus;
use crate::order_status::DenyReason;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password-related errors
    #[error("Password error: {0}")]
    Password(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists (conflict)
    #[error("{0} already exists")]
    Conflict(String),

    /// Unauthorized access attempt
    #[error("Unauthorized")]
    Unauthorized,

    /// Forbidden action
    #[error("Forbidden")]
    Forbidden,

    /// Invalid credentials provided
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(entity: impl Into<String>) -> Self {
        DomainError::Conflict(entity.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures of the order lifecycle use cases.
///
/// Four kinds only: each maps onto one user-facing category
/// (bad input, not found, forbidden transition, internal failure).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    /// The user could not be validated, or the order input is unusable
    #[error("Invalid user or order data: {0}")]
    ValidationFailed(String),

    /// The order does not exist or is not visible to the requester
    #[error("Order not found")]
    OrderNotFound,

    /// The status change is not allowed for this state and role
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        reason: DenyReason,
    },

    /// The order store failed
    #[error("Order persistence failed: {0}")]
    Persistence(String),
}

impl OrderError {
    /// Create a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        OrderError::ValidationFailed(msg.into())
    }

    /// Create a persistence failure
    pub fn persistence(msg: impl Into<String>) -> Self {
        OrderError::Persistence(msg.into())
    }
}

/// Result type alias for order use cases
pub type OrderResult<T> = Result<T, OrderError>;
