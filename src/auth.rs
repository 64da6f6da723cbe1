//! Bearer-token authentication: password hashing, token issuance and
//! verification, and the request-scoped current-user extractor.
//!
//! Tokens are stateless HS256 JWTs carrying the username as subject; their
//! validity is entirely signature + expiry, nothing is persisted.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::error;

use crate::config::AppConfig;
use crate::database::{users, StoreError};
use crate::error::ApiError;
use crate::models::User;
use crate::AppState;

/// Uniform 401 message: never reveals which part of the credential failed.
pub const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued for.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Sign a token for the given username, expiring a configured number of
/// minutes from now.
pub fn create_access_token(username: &str, config: &AppConfig) -> Result<String, ApiError> {
    let expire = Utc::now() + Duration::minutes(config.access_token_expire_minutes);
    let claims = Claims {
        sub: username.to_string(),
        exp: expire.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .map_err(|e| {
        error!("token signing failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })
}

/// Verify signature and expiry; `None` for anything malformed, expired,
/// tampered with, or missing a subject.
pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    if data.claims.sub.is_empty() {
        return None;
    }
    Some(data.claims)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to process credentials")
        })
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Credential check for token issuance: the account must exist, be active,
/// and verify the password. All three failures collapse to `None` so the
/// caller cannot distinguish a wrong password from a missing account.
pub async fn authenticate_user(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let Some(user) = users::get_by_username(pool, username).await? else {
        return Ok(None);
    };
    if user.active && verify_password(password, &user.password) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// The authenticated caller, resolved from the bearer token in the
/// `Authorization` header. Any token problem rejects with 401 and a Bearer
/// challenge; a valid token on a deactivated account rejects with 400.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;
        let claims = decode_token(&token, &state.config.secret_key)
            .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;
        let user = users::get_by_username(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;
        if !user.active {
            return Err(ApiError::bad_request("Inactive user"));
        }
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/test".to_string(),
            secret_key: "unit-test-secret".to_string(),
            access_token_expire_minutes: 30,
            port: 0,
        }
    }

    #[test]
    fn token_round_trips_subject() {
        let config = test_config();
        let token = create_access_token("Ruslan", &config).unwrap();
        let claims = decode_token(&token, &config.secret_key).unwrap();
        assert_eq!(claims.sub, "Ruslan");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tampered_token_fails() {
        let config = test_config();
        let token = create_access_token("Ruslan", &config).unwrap();
        assert!(decode_token(&token, "another-secret").is_none());

        let mut forged = token;
        forged.push('x');
        assert!(decode_token(&forged, &config.secret_key).is_none());
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        // Well past the default validation leeway.
        let claims = Claims {
            sub: "Ruslan".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .unwrap();
        assert!(decode_token(&token, &config.secret_key).is_none());
    }

    #[test]
    fn subjectless_token_fails() {
        let config = test_config();
        let claims = Claims {
            sub: String::new(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .unwrap();
        assert!(decode_token(&token, &config.secret_key).is_none());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("123456").unwrap();
        assert_ne!(hash, "123456");
        assert!(verify_password("123456", &hash));
        assert!(!verify_password("654321", &hash));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        assert!(!verify_password("123456", "not-a-phc-string"));
    }
}
