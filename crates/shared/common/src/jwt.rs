//! HS256 access tokens shared by the issuing and verifying services.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::{User, UserRole, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Signed token plus the metadata returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Sign an access token for `user`.
pub fn issue_token(user: &User, config: &JwtConfig) -> AppResult<IssuedToken> {
    let now = Utc::now();
    let lifetime = TimeDelta::try_hours(config.expiration_hours);
    let expires_at = lifetime
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| token_lifetime_error(config))?;
    let expires_in = config
        .expiration_hours
        .checked_mul(SECONDS_PER_HOUR)
        .ok_or_else(|| token_lifetime_error(config))?;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )?;

    Ok(IssuedToken {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in,
    })
}

fn token_lifetime_error(config: &JwtConfig) -> AppError {
    AppError::internal(format!(
        "token lifetime of {} hours is out of range",
        config.expiration_hours
    ))
}

/// Check signature and expiry, returning the claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_hours: 1,
        }
    }

    fn user() -> User {
        let mut user = User::new(
            Uuid::new_v4(),
            "root@example.com".to_string(),
            "hash".to_string(),
            "Root".to_string(),
        );
        user.role = UserRole::Admin;
        user
    }

    #[test]
    fn test_issue_then_verify() {
        let config = config("a-secret-that-is-long-enough-for-hs256!");
        let user = user();

        let issued = issue_token(&user, &config).unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 3600);

        let claims = verify_token(&issued.access_token, &config).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = issue_token(&user(), &config("first-secret-first-secret-first-sec")).unwrap();
        let result = verify_token(&issued.access_token, &config("other-secret-other-secret-other-se"));
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig {
            secret: "a-secret-that-is-long-enough-for-hs256!".to_string(),
            expiration_hours: -2,
        };
        let issued = issue_token(&user(), &config).unwrap();
        assert!(verify_token(&issued.access_token, &config).is_err());
    }

    #[test]
    fn test_out_of_range_lifetime_is_error() {
        for hours in [i64::MAX, i64::MIN, 3_000_000_000_000_000] {
            let config = JwtConfig {
                secret: "a-secret-that-is-long-enough-for-hs256!".to_string(),
                expiration_hours: hours,
            };
            assert!(matches!(
                issue_token(&user(), &config),
                Err(AppError::Internal(_))
            ));
        }
    }
}
