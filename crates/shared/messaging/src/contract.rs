//! Wire contract of the user validation channel.
//!
//! Payloads are JSON with camelCase keys:
//!
//! ```text
//! request: {"pattern":"validate_user","correlationId":"..","replyTo":"..","data":{"userId":".."}}
//! reply:   {"correlationId":"..","response":{"isValid":true,"user":{..}}}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::{
    UserProfile, VALIDATE_USER_PATTERN, VALIDATION_ERROR_INTERNAL, VALIDATION_ERROR_UNAVAILABLE,
    VALIDATION_ERROR_USER_NOT_FOUND,
};

/// Prefix of the per-client private reply queues
pub const REPLY_QUEUE_PREFIX: &str = "user_validation_reply:";

/// Body of a validation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserValidationRequest {
    pub user_id: String,
}

impl UserValidationRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Outcome of a validation.
///
/// `is_valid == true` implies `user` is present. `false` implies `error` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserValidationResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UserValidationResponse {
    pub fn valid(user: UserProfile) -> Self {
        Self {
            is_valid: true,
            user: Some(user),
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            user: None,
            error: Some(reason.into()),
        }
    }

    /// The user does not exist
    pub fn not_found() -> Self {
        Self::invalid(VALIDATION_ERROR_USER_NOT_FOUND)
    }

    /// The responder failed while looking the user up
    pub fn internal_error() -> Self {
        Self::invalid(VALIDATION_ERROR_INTERNAL)
    }

    /// The round trip itself failed (timeout, broker down, client closed)
    pub fn unavailable() -> Self {
        Self::invalid(VALIDATION_ERROR_UNAVAILABLE)
    }

    /// Profile of a positive validation.
    ///
    /// A reply claiming validity without a profile is treated as invalid.
    pub fn into_profile(self) -> Option<UserProfile> {
        if self.is_valid {
            self.user
        } else {
            None
        }
    }

    /// Failure reason, with a fallback for replies that omit it.
    pub fn reason(&self) -> &str {
        self.error.as_deref().unwrap_or(VALIDATION_ERROR_UNAVAILABLE)
    }
}

/// Request envelope published on the shared validation queue.
///
/// `data` is generic so a responder can accept the envelope first and
/// decode the body separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<T = UserValidationRequest> {
    pub pattern: String,
    pub correlation_id: Uuid,
    pub reply_to: String,
    pub data: T,
}

impl RequestEnvelope<UserValidationRequest> {
    pub fn validate_user(correlation_id: Uuid, reply_to: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            pattern: VALIDATE_USER_PATTERN.to_string(),
            correlation_id,
            reply_to: reply_to.into(),
            data: UserValidationRequest::new(user_id.to_string()),
        }
    }
}

/// Reply envelope pushed onto the requester's private queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub correlation_id: Uuid,
    pub response: UserValidationResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UserRole;
    use serde_json::json;

    #[test]
    fn test_request_envelope_shape() {
        let correlation_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let envelope = RequestEnvelope::validate_user(correlation_id, "reply-q", user_id);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "pattern": "validate_user",
                "correlationId": correlation_id.to_string(),
                "replyTo": "reply-q",
                "data": { "userId": user_id.to_string() }
            })
        );
    }

    #[test]
    fn test_valid_response_shape() {
        let id = Uuid::new_v4();
        let response = UserValidationResponse::valid(UserProfile {
            id,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            role: UserRole::Admin,
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["isValid"], json!(true));
        assert_eq!(value["user"]["role"], json!("ADMIN"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_invalid_response_parses_without_user() {
        let response: UserValidationResponse =
            serde_json::from_str(r#"{"isValid":false,"error":"user not found"}"#).unwrap();
        assert_eq!(response, UserValidationResponse::not_found());
        assert_eq!(response.reason(), "user not found");
        assert!(response.into_profile().is_none());
    }

    #[test]
    fn test_valid_claim_without_profile_yields_nothing() {
        let response: UserValidationResponse = serde_json::from_str(r#"{"isValid":true}"#).unwrap();
        assert!(response.into_profile().is_none());
    }
}
