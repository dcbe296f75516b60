use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON and failed rules both become `AppError::Validation`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => body,
            Err(rejection) => return Err(AppError::validation(rejection.body_text())),
        };

        match body.validate() {
            Ok(()) => Ok(Self(body)),
            Err(errors) => Err(AppError::validation(describe(&errors))),
        }
    }
}

/// Field messages ordered by field name. Rules without a message fall back
/// to "<field> is invalid".
pub(crate) fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_unstable_by_key(|(field, _)| *field);

    let mut messages = Vec::new();
    for (field, failures) in fields {
        for failure in failures {
            messages.push(match &failure.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            });
        }
    }
    messages.join(", ")
}
