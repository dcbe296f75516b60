//! Answers `validate_user` requests from other services.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use messaging::{UserValidationRequest, UserValidationResponse, ValidationHandler};

use crate::repository::UserRepository;

/// Read-only lookup of a user's existence and profile.
pub struct UserValidationResponder {
    repo: Arc<dyn UserRepository>,
}

impl UserValidationResponder {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ValidationHandler for UserValidationResponder {
    async fn handle(&self, request: UserValidationRequest) -> UserValidationResponse {
        // An unparsable ID cannot name a stored user.
        let Ok(user_id) = Uuid::parse_str(request.user_id.trim()) else {
            tracing::debug!("Validation for malformed user id {:?}", request.user_id);
            return UserValidationResponse::not_found();
        };

        match self.repo.find_by_id(user_id).await {
            Ok(Some(user)) => {
                tracing::debug!("User {} validated", user_id);
                UserValidationResponse::valid(user.profile())
            }
            Ok(None) => {
                tracing::debug!("User {} not found", user_id);
                UserValidationResponse::not_found()
            }
            Err(e) => {
                tracing::error!("User lookup failed for {}: {}", user_id, e);
                UserValidationResponse::internal_error()
            }
        }
    }
}
