//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::Database;
use crate::service::{AuthService, UserService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    /// Absent in tests that run the router without a database
    pub database: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Option<Arc<Database>>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
        }
    }
}
