pub mod provider;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind as JwtErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::{AuthTokens, UserIdentity};

pub use provider::{hash_password, AuthProvider, NewUser, UserDirectory};

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: String,
    pub user_id: Uuid,
    pub username: String,
    pub jti: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn new(token_type: &str, user: &UserIdentity, issuer: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_type: token_type.to_string(),
            user_id: user.id,
            username: user.username.clone(),
            jti: Uuid::new_v4().simple().to_string(),
            iss: issuer.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("token has wrong type, expected '{expected}'")]
    WrongType { expected: &'static str },
}

/// Mints the token pair handed out on login
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &UserIdentity) -> Result<AuthTokens, JwtError>;
}

/// HS256 access/refresh tokens
#[derive(Clone)]
pub struct JwtTokenIssuer {
    secret: String,
    issuer: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl JwtTokenIssuer {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            issuer: security.jwt_issuer.clone(),
            access_lifetime: Duration::minutes(security.access_token_lifetime_minutes),
            refresh_lifetime: Duration::days(security.refresh_token_lifetime_days),
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Decode a token and check its signature, issuer, expiry and type
    pub fn verify(&self, token: &str, expected_type: &'static str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.token_type != expected_type {
            return Err(JwtError::WrongType {
                expected: expected_type,
            });
        }
        Ok(claims)
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &UserIdentity) -> Result<AuthTokens, JwtError> {
        let access = Claims::new(ACCESS, user, &self.issuer, self.access_lifetime);
        let refresh = Claims::new(REFRESH, user, &self.issuer, self.refresh_lifetime);
        Ok(AuthTokens {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(&AppConfig::development().security)
    }

    #[test]
    fn issues_distinct_access_and_refresh_tokens() {
        let user = UserIdentity::new("alice");
        let tokens = issuer().issue(&user).unwrap();
        assert!(!tokens.access.is_empty());
        assert!(!tokens.refresh.is_empty());
        assert_ne!(tokens.access, tokens.refresh);

        let claims = issuer().verify(&tokens.access, ACCESS).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.user_id, user.id);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = issuer().issue(&UserIdentity::new("alice")).unwrap();
        assert!(matches!(
            issuer().verify(&tokens.refresh, ACCESS),
            Err(JwtError::WrongType { expected: "access" })
        ));
    }

    #[test]
    fn expired_tokens_are_reported() {
        let mut security = AppConfig::development().security;
        security.access_token_lifetime_minutes = -5;
        let issuer = JwtTokenIssuer::new(&security);
        let tokens = issuer.issue(&UserIdentity::new("alice")).unwrap();
        assert!(matches!(issuer.verify(&tokens.access, ACCESS), Err(JwtError::Expired)));
    }

    #[test]
    fn missing_secret_is_rejected() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        let issuer = JwtTokenIssuer::new(&security);
        assert!(matches!(
            issuer.issue(&UserIdentity::new("alice")),
            Err(JwtError::InvalidSecret)
        ));
    }
}
