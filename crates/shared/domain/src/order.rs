//! Order domain entity and line items.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_MONEY_CENTS, MIN_ITEM_QUANTITY, MONEY_SCALE};
use crate::error::{OrderError, OrderResult};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProcess,
    Completed,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::InProcess,
        OrderStatus::Completed,
    ];

    /// Canonical string form used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProcess => "IN_PROCESS",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::validation(format!("Unknown order status: {}", s)))
    }
}

/// A line of an order as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    /// Price multiplied by quantity, `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A stored order line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Check whether the given user owns this order
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Largest amount a stored price or total may take.
pub fn max_money_amount() -> Decimal {
    Decimal::new(MAX_MONEY_CENTS, MONEY_SCALE)
}

/// True when `amount` has no more than two significant decimals.
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Reject unusable order lines before anything is persisted.
pub fn validate_items(items: &[NewOrderItem]) -> OrderResult<()> {
    if items.is_empty() {
        return Err(OrderError::validation("Order must contain at least one item"));
    }

    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(OrderError::validation("Product ID cannot be empty"));
        }
        if item.quantity < MIN_ITEM_QUANTITY {
            return Err(OrderError::validation(format!(
                "Quantity must be at least {}",
                MIN_ITEM_QUANTITY
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(OrderError::validation("Price cannot be negative"));
        }
        if item.price > max_money_amount() {
            return Err(OrderError::validation(format!(
                "Price cannot exceed {}",
                max_money_amount()
            )));
        }
        if !is_whole_cents(item.price) {
            return Err(OrderError::validation(format!(
                "Price cannot have more than {} decimal places",
                MONEY_SCALE
            )));
        }
    }

    Ok(())
}

/// Σ(price × quantity) over lines already accepted by [`validate_items`].
///
/// Fails when the sum overflows or exceeds what an order total can store.
pub fn compute_total(items: &[NewOrderItem]) -> OrderResult<Decimal> {
    let too_large = || {
        OrderError::validation(format!("Order total cannot exceed {}", max_money_amount()))
    };

    let total = items.iter().try_fold(Decimal::ZERO, |sum, item| {
        item.line_total()
            .and_then(|line| sum.checked_add(line))
            .ok_or_else(too_large)
    })?;

    if total > max_money_amount() {
        return Err(too_large());
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, quantity: i32, price: &str) -> NewOrderItem {
        NewOrderItem {
            product_id: product.to_string(),
            quantity,
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_total_of_multiple_items() {
        let items = vec![item("product-1", 2, "10.50"), item("product-2", 1, "25.00")];
        assert_eq!(compute_total(&items).unwrap(), Decimal::from_str("46.00").unwrap());
    }

    #[test]
    fn test_total_independent_of_item_order() {
        let mut items = vec![
            item("a", 3, "0.10"),
            item("b", 7, "19.99"),
            item("c", 1, "0.01"),
        ];
        let forward = compute_total(&items).unwrap();
        items.reverse();
        assert_eq!(forward, compute_total(&items).unwrap());
        assert_eq!(forward, Decimal::from_str("140.24").unwrap());
    }

    #[test]
    fn test_total_single_line() {
        let items = vec![item("productA", 2, "29.99")];
        assert_eq!(compute_total(&items).unwrap(), Decimal::from_str("59.98").unwrap());
    }

    #[test]
    fn test_sub_cent_price_rejected() {
        assert!(matches!(
            validate_items(&[item("a", 3, "0.335")]),
            Err(OrderError::ValidationFailed(_))
        ));
        assert!(validate_items(&[item("a", 3, "0.340")]).is_ok());
    }

    #[test]
    fn test_accepted_lines_total_matches_stored_prices() {
        let items = vec![item("a", 3, "0.34"), item("b", 2, "10.5"), item("c", 7, "19.99")];
        assert!(validate_items(&items).is_ok());

        let stored: Decimal = items
            .iter()
            .map(|i| i.price.round_dp(MONEY_SCALE) * Decimal::from(i.quantity))
            .sum();
        assert_eq!(compute_total(&items).unwrap(), stored);
    }

    #[test]
    fn test_price_above_column_limit_rejected() {
        assert!(validate_items(&[item("a", 1, "9999999999.99")]).is_ok());
        assert!(validate_items(&[item("a", 1, "10000000000")]).is_err());
        assert!(validate_items(&[item("a", 2, "100000000000000000000")]).is_err());
    }

    #[test]
    fn test_huge_total_is_validation_failure() {
        let items = vec![item("a", i32::MAX, "9999999999.99")];
        assert!(validate_items(&items).is_ok());
        assert!(matches!(
            compute_total(&items),
            Err(OrderError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_overflowing_product_does_not_panic() {
        let items = vec![item("a", i32::MAX, "79228162514264337593543950335")];
        assert!(matches!(
            compute_total(&items),
            Err(OrderError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_total_at_column_limit_accepted() {
        let items = vec![item("a", 1, "9999999999.98"), item("b", 1, "0.01")];
        assert_eq!(compute_total(&items).unwrap(), max_money_amount());
        assert!(compute_total(&[item("a", 1, "9999999999.99"), item("b", 1, "0.01")]).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_order() {
        assert!(matches!(
            validate_items(&[]),
            Err(OrderError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        assert!(validate_items(&[item("a", 0, "1.00")]).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        assert!(validate_items(&[item("a", 1, "-0.01")]).is_err());
    }

    #[test]
    fn test_validate_accepts_free_item() {
        assert!(validate_items(&[item("gift", 1, "0")]).is_ok());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::from_str("SHIPPED").is_err());
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProcess).unwrap(),
            "\"IN_PROCESS\""
        );
    }
}
