//! JWT Authentication

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pm_core::Id;
use pm_models::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Id,
    /// Role at the time the token was issued
    pub role: Role,
    /// Organization the token was issued for
    pub organization_id: Id,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// JWT ID
    pub jti: String,
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_seconds: u64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and token lifetime
    pub fn new(secret: &[u8], expires_in_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expires_in_seconds,
        }
    }

    /// Create a new JWT token
    pub fn create_token(
        &self,
        user_id: Id,
        role: Role,
        organization_id: Id,
    ) -> Result<String, JwtError> {
        let now = Utc::now().timestamp().max(0) as usize;

        let claims = Claims {
            sub: user_id,
            role,
            organization_id,
            exp: now + self.expires_in_seconds as usize,
            iat: now,
            jti: Id::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let prefix = authorization.get(..7)?;
    if prefix.eq_ignore_ascii_case("bearer ") {
        Some(authorization[7..].trim()).filter(|t| !t.is_empty())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    #[test]
    fn test_create_and_validate_token() {
        let service = JwtService::new(SECRET, 3600);
        let user = Id::new_v4();
        let org = Id::new_v4();

        let token = service.create_token(user, Role::Admin, org).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.organization_id, org);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtService::new(SECRET, 3600)
            .create_token(Id::new_v4(), Role::Employee, Id::new_v4())
            .unwrap();

        let other = JwtService::new(b"another-secret-key-of-enough-size", 3600);
        assert!(matches!(other.validate_token(&token), Err(JwtError::Invalid(_))));
        assert!(other.validate_token("garbage").is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET, 3600);
        let past = (Utc::now().timestamp() - 7200) as usize;
        let claims = Claims {
            sub: Id::new_v4(),
            role: Role::Employee,
            organization_id: Id::new_v4(),
            exp: past,
            iat: past - 3600,
            jti: "x".into(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bear"), None);
    }
}
