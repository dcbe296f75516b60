//! Service layer - business logic.

mod auth_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator, LoginResult};
pub use user_service::{AdminBootstrap, UserManager, UserService};
