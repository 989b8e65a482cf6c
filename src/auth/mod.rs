use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::Role;

pub mod password;

pub use password::{
    hash_password, normalize_email, validate_email_format, validate_password, verify_against_dummy, verify_password,
};

/// JWT claims. `sid` ties the token to a row in `auth_sessions`, so a token
/// stays valid only while that session is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub sid: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, session_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            sid: session_id,
            role,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Expiry for a session created now
pub fn session_expiry() -> DateTime<Utc> {
    let hours = config::config().security.jwt_expiry_hours;
    Utc::now() + Duration::hours(hours as i64)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    generate_jwt_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    validate_jwt_with_secret(token, &config::config().security.jwt_secret)
}

fn generate_jwt_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn validate_jwt_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims_expiring_in(hours: i64) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Role::Patient,
            Utc::now() + Duration::hours(hours),
        )
    }

    #[test]
    fn token_round_trips_claims() {
        let claims = claims_expiring_in(1);
        let token = generate_jwt_with_secret(&claims, SECRET).unwrap();
        let decoded = validate_jwt_with_secret(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.sid, claims.sid);
        assert_eq!(decoded.role, Role::Patient);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_jwt_with_secret(&claims_expiring_in(-2), SECRET).unwrap();
        let err = validate_jwt_with_secret(&token, SECRET).unwrap_err();
        assert!(matches!(err, JwtError::InvalidToken(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt_with_secret(&claims_expiring_in(1), SECRET).unwrap();
        assert!(validate_jwt_with_secret(&token, "another-secret").is_err());
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let err = generate_jwt_with_secret(&claims_expiring_in(1), "").unwrap_err();
        assert!(matches!(err, JwtError::InvalidSecret));
    }
}
