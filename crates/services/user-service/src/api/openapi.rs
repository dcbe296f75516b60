//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::handlers::auth_handler::{LoginRequest, LoginResponse};
use super::handlers::user_handler::RegisterRequest;
use domain::{UserResponse, UserRole};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(title = "User Service", description = "User registration, login and profiles"),
    paths(
        crate::api::handlers::user_handler::register,
        crate::api::handlers::auth_handler::login,
        crate::api::handlers::auth_handler::profile,
    ),
    components(schemas(RegisterRequest, LoginRequest, LoginResponse, UserResponse, UserRole)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Account registration"),
        (name = "Authentication", description = "Login and current user"),
    )
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
