//! Route configuration.

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{health_routes, order_routes};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the order service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/orders", order_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
