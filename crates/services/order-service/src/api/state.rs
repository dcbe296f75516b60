//! Application state for dependency injection.

use std::sync::Arc;

use common::JwtConfig;

use crate::infra::Database;
use crate::service::OrderService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<dyn OrderService>,
    /// Tokens are issued by the user service and verified locally
    pub jwt: Arc<JwtConfig>,
    /// Absent in tests that run the router without a database
    pub database: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        order_service: Arc<dyn OrderService>,
        jwt: JwtConfig,
        database: Option<Arc<Database>>,
    ) -> Self {
        Self {
            order_service,
            jwt: Arc::new(jwt),
            database,
        }
    }
}
