//! Order handlers. Every route requires a bearer token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use common::http::ValidatedJson;
use common::AppResult;
use domain::{
    is_whole_cents, max_money_amount, NewOrderItem, OrderItem, OrderStatus, UserProfile,
};

use crate::api::middleware::{auth_middleware, require_admin, CurrentUser};
use crate::api::AppState;
use crate::service::EnrichedOrder;

/// One line of a new order
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "Product ID is required"))]
    #[schema(example = "productA")]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 2)]
    pub quantity: i32,
    /// Unit price
    #[validate(custom(function = "storable_price"))]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 29.99)]
    pub price: Decimal,
}

fn storable_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if *price < Decimal::ZERO {
        "Price cannot be negative"
    } else if *price > max_money_amount() {
        "Price is too large"
    } else if !is_whole_cents(*price) {
        "Price cannot have more than 2 decimal places"
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("price");
    err.message = Some(message.into());
    Err(err)
}

/// Create order request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub order_items: Vec<OrderItemRequest>,
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
        }
    }
}

/// An order with its lines and a snapshot of the owner
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 59.98)]
    pub total_amount: Decimal,
    pub order_items: Vec<OrderItemResponse>,
    pub user: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EnrichedOrder> for OrderResponse {
    fn from(EnrichedOrder { order, user }: EnrichedOrder) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total_amount: order.total_amount,
            order_items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            user,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

fn to_responses(orders: Vec<EnrichedOrder>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

/// Create order routes
pub fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/all", get(list_all_orders))
        .route("/:id", patch(update_order_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Place an order for the authenticated user
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid order or unknown user"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let items = payload
        .order_items
        .into_iter()
        .map(|item| NewOrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        })
        .collect();

    let order = state
        .order_service
        .create_order(current_user.id, items)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// List orders: all of them for ADMIN, own orders otherwise
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<OrderResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let orders = state
        .order_service
        .list_orders(current_user.id, current_user.role)
        .await?;

    Ok(Json(to_responses(orders)))
}

/// List every order (admin only)
#[utoipa::path(
    get,
    path = "/orders/all",
    tag = "Orders",
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<OrderResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    require_admin(&current_user)?;

    let orders = state
        .order_service
        .list_orders(current_user.id, current_user.role)
        .await?;

    Ok(Json(to_responses(orders)))
}

/// Change an order's status (admin only)
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Transition not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<OrderResponse>> {
    require_admin(&current_user)?;

    let order = state
        .order_service
        .update_order_status(id, current_user.id, payload.status)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_camel_case() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "orderItems": [{ "productId": "productA", "quantity": 2, "price": 29.99 }]
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.order_items[0].product_id, "productA");
        assert_eq!(request.order_items[0].price.to_string(), "29.99");
    }

    #[test]
    fn test_create_request_rejects_bad_lines() {
        for body in [
            serde_json::json!({ "orderItems": [] }),
            serde_json::json!({ "orderItems": [{ "productId": "a", "quantity": 0, "price": 1.0 }] }),
            serde_json::json!({ "orderItems": [{ "productId": "a", "quantity": 1, "price": -1.0 }] }),
        ] {
            let request: CreateOrderRequest = serde_json::from_value(body).unwrap();
            assert!(request.validate().is_err());
        }
    }

    #[test]
    fn test_create_request_rejects_unstorable_prices() {
        for price in [serde_json::json!(1e20), serde_json::json!(0.335)] {
            let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
                "orderItems": [{ "productId": "a", "quantity": 1, "price": price }]
            }))
            .unwrap();
            assert!(request.validate().is_err(), "{} accepted", price);
        }
    }

    #[test]
    fn test_free_item_is_valid() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "orderItems": [{ "productId": "gift", "quantity": 1, "price": 0 }]
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
