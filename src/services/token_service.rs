use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use jsonwebtoken::errors::ErrorKind;
use std::fmt;
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::AuthenticationError;
use crate::types::internal::Claims;

/// Manages JWT token generation and validation
pub struct TokenService {
    jwt_secret: String,
    jwt_expiration_minutes: i64,
}

impl TokenService {
    /// Create a new TokenService with the given JWT secret
    pub fn new(jwt_secret: String, jwt_expiration_minutes: i64) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_minutes,
        }
    }

    /// Generate a JWT for the given user id
    ///
    /// # Arguments
    /// * `user_id` - Primary key of the user
    ///
    /// # Returns
    /// * `Ok((token, expires_in_seconds))`
    /// * `Err(InternalError::Crypto)` - Encoding failed
    pub fn generate_jwt(&self, user_id: i32) -> Result<(String, i64), InternalError> {
        let now = Utc::now().timestamp();
        let expires_in = self.jwt_expiration_minutes * 60;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + expires_in,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_encode", e.to_string()))?;

        Ok((token, expires_in))
    }

    /// Validate a JWT and return the user id it was issued for
    ///
    /// # Returns
    /// * `Ok(user_id)` - Signature and expiry are valid
    /// * `Err(AuthenticationError::ExpiredToken)` - Token has expired
    /// * `Err(AuthenticationError::InvalidToken)` - Anything else
    pub fn validate_jwt(&self, token: &str) -> Result<i32, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthenticationError::ExpiredToken,
            _ => AuthenticationError::invalid_token(e.to_string()),
        })?;

        let user_id = token_data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthenticationError::invalid_token("subject is not a user id"))?;

        Ok(user_id)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-minimum-32-characters-long";

    #[test]
    fn test_generate_then_validate_returns_subject() {
        let tokens = TokenService::new(SECRET.to_string(), 60);

        let (token, expires_in) = tokens.generate_jwt(42).unwrap();

        assert_eq!(expires_in, 3600);
        assert_eq!(tokens.validate_jwt(&token).unwrap(), 42);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        // Well past the default 60s leeway
        let tokens = TokenService::new(SECRET.to_string(), -10);
        let (token, _) = tokens.generate_jwt(1).unwrap();

        let result = tokens.validate_jwt(&token);

        assert!(matches!(
            result,
            Err(InternalError::Authentication(AuthenticationError::ExpiredToken))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let issuer = TokenService::new("another-secret-key-that-is-32-chars-long".to_string(), 60);
        let verifier = TokenService::new(SECRET.to_string(), 60);
        let (token, _) = issuer.generate_jwt(1).unwrap();

        let result = verifier.validate_jwt(&token);

        assert!(matches!(
            result,
            Err(InternalError::Authentication(AuthenticationError::InvalidToken { .. }))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let tokens = TokenService::new(SECRET.to_string(), 60);

        assert!(tokens.validate_jwt("not-a-jwt").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let tokens = TokenService::new(SECRET.to_string(), 60);

        assert!(!format!("{:?}", tokens).contains(SECRET));
    }
}
