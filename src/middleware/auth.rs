use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{Claims, JwtError, ACCESS};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware that validates access tokens and injects `AuthUser`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers)?;

    // Validate and decode JWT
    let claims = state.tokens.verify(&token, ACCESS).map_err(|e| match e {
        JwtError::Expired => ApiError::authentication_timeout(None),
        JwtError::InvalidSecret => ApiError::configuration(e.to_string()),
        other => {
            tracing::debug!("Rejected access token: {}", other);
            ApiError::invalid_credentials(Some("Given token not valid for any token type"))
        }
    })?;

    // Tokens outlive accounts; refuse users no longer in the directory
    if state.users.retrieve(&claims.username).await.is_err() {
        tracing::warn!(username = %claims.username, "token for unknown user");
        return Err(ApiError::access_forbidden(None));
    }

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::invalid_credentials(Some("Authentication credentials were not provided.")))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::invalid_credentials(Some("Invalid Authorization header format")))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err(ApiError::invalid_credentials(Some("Empty JWT token"))),
        None => Err(ApiError::invalid_credentials(Some(
            "Authorization header must use Bearer token format",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        let missing = extract_jwt_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(missing.get_code(), 401);
        assert_eq!(missing.get_message(), "Authentication credentials were not provided.");

        assert_eq!(extract_jwt_from_headers(&headers("Basic xyz")).unwrap_err().get_code(), 401);
        assert_eq!(
            extract_jwt_from_headers(&headers("Bearer  ")).unwrap_err().get_message(),
            "Empty JWT token"
        );
    }
}
