use std::sync::Arc;

use crate::auth::{AuthProvider, TokenIssuer};
use crate::error::ApiError;
use crate::types::{AuthTokens, UserIdentity};

/// Login flow over the authentication provider and the token issuer
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { provider, issuer }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserIdentity, AuthTokens), ApiError> {
        let Some(user) = self.provider.authenticate(username, password).await else {
            tracing::warn!(username, "login rejected");
            return Err(ApiError::invalid_credentials(Some(
                "Unable to log in with provided credentials.",
            )));
        };

        let tokens = self.get_user_tokens(&user)?;
        tracing::info!(username, user_id = %user.id, "login succeeded");
        Ok((user, tokens))
    }

    pub fn get_user_tokens(&self, user: &UserIdentity) -> Result<AuthTokens, ApiError> {
        Ok(self.issuer.issue(user)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, JwtTokenIssuer, UserDirectory};
    use crate::config::{AppConfig, SeedUser};

    fn service() -> AuthService {
        let config = AppConfig::development();
        let directory = UserDirectory::from_seed(&[SeedUser {
            username: "alice".to_string(),
            password_digest: hash_password("alice", "wonderland"),
        }]);
        AuthService::new(
            Arc::new(directory),
            Arc::new(JwtTokenIssuer::new(&config.security)),
        )
    }

    #[tokio::test]
    async fn login_returns_user_and_tokens() {
        let (user, tokens) = service().login("alice", "wonderland").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(!tokens.access.is_empty());
        assert!(!tokens.refresh.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let err = service().login("alice", "nope").await.unwrap_err();
        assert_eq!(err.get_code(), 401);
        assert_eq!(err.get_message(), "Unable to log in with provided credentials.");
    }
}
