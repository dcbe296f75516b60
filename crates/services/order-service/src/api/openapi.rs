//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::handlers::order_handler::{
    CreateOrderRequest, OrderItemRequest, OrderItemResponse, OrderResponse,
    UpdateOrderStatusRequest,
};
use domain::{OrderStatus, UserProfile, UserRole};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(title = "Order Service", description = "Order placement and status tracking"),
    paths(
        crate::api::handlers::order_handler::create_order,
        crate::api::handlers::order_handler::list_orders,
        crate::api::handlers::order_handler::list_all_orders,
        crate::api::handlers::order_handler::update_order_status,
    ),
    components(schemas(
        CreateOrderRequest,
        OrderItemRequest,
        UpdateOrderStatusRequest,
        OrderResponse,
        OrderItemResponse,
        OrderStatus,
        UserProfile,
        UserRole
    )),
    modifiers(&SecurityAddon),
    tags((name = "Orders", description = "Order placement and status changes"))
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
