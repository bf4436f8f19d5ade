use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::Claims;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Wrong token type for the operation (e.g. refresh token used as access)
    #[error("Wrong token type: expected {expected}")]
    WrongTokenType {
        /// The token type the operation required
        expected: &'static str,
    },

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("Security error: {0}")]
    Generic(String),
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

impl TokenType {
    /// Get the expiration duration for this token type
    fn expiration(&self) -> Duration {
        match self {
            TokenType::Access => {
                // Access tokens expire in 24 hours
                let expiration_hours = env::var("ACCESS_TOKEN_EXPIRATION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse::<i64>()
                    .unwrap_or(24);

                Duration::hours(expiration_hours)
            }
            TokenType::Refresh => {
                // Refresh tokens expire in 30 days
                let expiration_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<i64>()
                    .unwrap_or(30);

                Duration::days(expiration_days)
            }
        }
    }

    /// The claim value stored in the token
    fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

fn jwt_secret() -> Result<String, SecurityError> {
    env::var("JWT_SECRET").map_err(|_| {
        error!("JWT_SECRET environment variable not found");
        SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
    })
}

fn jwt_issuer() -> String {
    env::var("JWT_ISSUER").unwrap_or_else(|_| "aarogya-sahayak-api".to_string())
}

/// Generate a new JWT token carrying the user's id and role
pub fn generate_token(
    user_id: &str,
    role: &str,
    token_type: TokenType,
) -> Result<String, SecurityError> {
    let secret = jwt_secret()?;

    let now = Utc::now();
    let expiration = now + token_type.expiration();

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        token_type: token_type.as_str().to_string(),
        iss: jwt_issuer(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation but never the token itself
    info!("Generated {:?} token for user {}", token_type, user_id);
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a JWT token and return the decoded claims
pub fn validate_token(token: &str) -> Result<Claims, SecurityError> {
    let secret = jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[jwt_issuer()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Validate a token and require it to be an access token.
/// Refresh tokens must not be usable on protected endpoints.
pub fn validate_access_token(token: &str) -> Result<Claims, SecurityError> {
    let claims = validate_token(token)?;

    if claims.token_type != TokenType::Access.as_str() {
        return Err(SecurityError::WrongTokenType { expected: "access" });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        std::env::set_var("JWT_ISSUER", "test-issuer");
    }

    #[test]
    fn test_generate_and_validate_token() {
        setup_test_env();

        let token = generate_token("test-user-123", "patient", TokenType::Access).unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.sub, "test-user-123");
        assert_eq!(claims.role, "patient");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_expired_token_rejected() {
        setup_test_env();

        let claims = Claims {
            sub: "test-user-456".to_string(),
            role: "patient".to_string(),
            token_type: "access".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() - 3600,
        };

        let secret = std::env::var("JWT_SECRET").unwrap();
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        match validate_token(&token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired but got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_rejected() {
        setup_test_env();

        let result = validate_token("invalid.token.format");
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        setup_test_env();

        let token = generate_token("test-user-789", "asha", TokenType::Refresh).unwrap();

        match validate_access_token(&token) {
            Err(SecurityError::WrongTokenType { expected: "access" }) => {}
            other => panic!("Expected WrongTokenType but got: {:?}", other),
        }
    }

    #[test]
    fn test_token_type_expirations() {
        setup_test_env();
        std::env::set_var("ACCESS_TOKEN_EXPIRATION_HOURS", "24");
        std::env::set_var("REFRESH_TOKEN_EXPIRATION_DAYS", "30");

        assert_eq!(TokenType::Access.expiration(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.expiration(), Duration::days(30));
    }
}
