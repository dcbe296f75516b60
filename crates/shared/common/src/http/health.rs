use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ServiceHealth>,
}

/// State of one dependency.
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn new<E: Display>(service: &'static str, database: Option<Result<(), E>>) -> Self {
        let database = database.map(|ping| match ping {
            Ok(()) => ServiceHealth {
                status: "healthy",
                error: None,
            },
            Err(e) => ServiceHealth {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        });
        let healthy = database.as_ref().map_or(true, |db| db.error.is_none());

        Self {
            status: if healthy { "healthy" } else { "degraded" },
            service,
            database,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// 200 when every checked dependency answered, 503 otherwise.
///
/// `database` is `None` when the service runs without one.
pub fn health_response<E: Display>(
    service: &'static str,
    database: Option<Result<(), E>>,
) -> Response {
    let report = HealthResponse::new(service, database);
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}
