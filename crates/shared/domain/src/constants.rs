//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "USER";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "ADMIN";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role))
}

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum quantity for an order line
pub const MIN_ITEM_QUANTITY: i32 = 1;

/// Decimal places kept on monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a DECIMAL(12,2) column holds, in cents
pub const MAX_MONEY_CENTS: i64 = 999_999_999_999;

// =============================================================================
// User Validation Protocol
// =============================================================================

/// Durable queue shared by every validation caller and responder
pub const USER_VALIDATION_QUEUE: &str = "user_validation_queue";

/// Message pattern carried by validation request envelopes
pub const VALIDATE_USER_PATTERN: &str = "validate_user";

/// Default upper bound on a validation round trip, in milliseconds
pub const DEFAULT_VALIDATION_TIMEOUT_MS: u64 = 5000;

/// Reason returned when the requested user does not exist
pub const VALIDATION_ERROR_USER_NOT_FOUND: &str = "user not found";

/// Reason returned when the responder failed to look the user up
pub const VALIDATION_ERROR_INTERNAL: &str = "internal error";

/// Reason returned to callers when the round trip itself failed
pub const VALIDATION_ERROR_UNAVAILABLE: &str = "user validation failed";

/// Display name used when an order owner could not be resolved
pub const PLACEHOLDER_USER_NAME: &str = "user not found";

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 1;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
