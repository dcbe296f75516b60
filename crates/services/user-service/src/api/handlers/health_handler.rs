//! Health check handler.

use axum::{extract::State, response::Response, routing::get, Router};

use common::http::health_response;

use crate::api::AppState;

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Reports database connectivity when a database is attached.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match &state.database {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    health_response("user-service", database)
}
