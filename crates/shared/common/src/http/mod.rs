//! Pieces of the HTTP surface shared by every service.

mod health;
mod validated_json;

pub use health::{health_response, HealthResponse, ServiceHealth};
pub use validated_json::ValidatedJson;
