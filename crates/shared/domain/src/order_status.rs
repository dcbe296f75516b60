//! Order status transition rules.
//!
//! Transitions are gated by the requester's role:
//!
//! | from \ to  | IN_PROCESS | COMPLETED  |
//! |------------|------------|------------|
//! | PENDING    | ADMIN only | ADMIN only |
//! | IN_PROCESS | -          | ADMIN only |
//! | COMPLETED  | forbidden  | forbidden  |
//!
//! Everything here is pure: no I/O and no hidden state.

use serde::Serialize;

use crate::error::OrderError;
use crate::order::OrderStatus;
use crate::user::UserRole;

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The requester's role may not change order status at all
    RoleInsufficient,
    /// The pair is not in the transition table
    NotPermitted,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::RoleInsufficient => f.write_str("role not allowed to change order status"),
            DenyReason::NotPermitted => f.write_str("transition not permitted from this state"),
        }
    }
}

/// Verdict of [`check_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Allow,
    Deny(DenyReason),
}

impl Transition {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Transition::Allow)
    }

    /// Turn a denial into the caller-visible error for this pair.
    pub fn into_result(self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        match self {
            Transition::Allow => Ok(()),
            Transition::Deny(reason) => Err(OrderError::InvalidTransition { from, to, reason }),
        }
    }
}

/// Decide whether `role` may move an order from `current` to `requested`.
pub fn check_transition(current: OrderStatus, requested: OrderStatus, role: UserRole) -> Transition {
    match role {
        UserRole::User => Transition::Deny(DenyReason::RoleInsufficient),
        UserRole::Admin => {
            if is_listed(current, requested) {
                Transition::Allow
            } else {
                Transition::Deny(DenyReason::NotPermitted)
            }
        }
    }
}

fn is_listed(current: OrderStatus, requested: OrderStatus) -> bool {
    use crate::order::OrderStatus::*;

    match current {
        Pending => matches!(requested, InProcess | Completed),
        InProcess => matches!(requested, Completed),
        // terminal
        Completed => false,
    }
}
