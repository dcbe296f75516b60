//! Authentication service - credential checks and token handling.

use async_trait::async_trait;
use std::sync::Arc;

use common::jwt::{self, Claims, IssuedToken};
use common::{AppError, AppResult, JwtConfig};
use domain::{Password, User};

use crate::repository::UserRepository;

// Verified against when the email is unknown so both paths cost one argon2 run.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$ZHVtbXloYXNoMTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMg";

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: IssuedToken,
    pub user: User,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue an access token
    async fn login(&self, email: String, password: String) -> AppResult<LoginResult>;

    /// Verify an access token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    config: JwtConfig,
}

impl Authenticator {
    pub fn new(repo: Arc<dyn UserRepository>, config: JwtConfig) -> Self {
        Self { repo, config }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: String, password: String) -> AppResult<LoginResult> {
        let found = self.repo.find_by_email(&email).await?;

        let stored_hash = found
            .as_ref()
            .map(|user| user.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = Password::from_hash(stored_hash).verify(&password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => {
                tracing::debug!("Rejected login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = jwt::issue_token(&user, &self.config)?;
        tracing::info!("User {} logged in", user.id);
        Ok(LoginResult { token, user })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        jwt::verify_token(token, &self.config)
    }
}
