// handlers/auth.rs - Authentication viewset
//
// POST /auth/login/     exchange credentials for an access/refresh pair
// POST /auth/validate/  dry-run validation for any action of this viewset

use axum::extract::State;
use axum::http::StatusCode;

use crate::api::ApiResult;
use crate::serializers::schemas;
use crate::state::AppState;
use crate::viewset::{Payload, SerializerRegistry, ValidationOptions, ViewSet, ViewSetDefinition};

pub const LOGIN: &str = "login";
pub const VALIDATE: &str = "validate";

pub struct AuthViewSet;

impl ViewSetDefinition for AuthViewSet {
    const BASENAME: &'static str = "auth";
    const VALIDATING_ACTIONS: &'static [&'static str] = &[LOGIN];

    fn serializers() -> SerializerRegistry {
        SerializerRegistry::builder(Self::BASENAME)
            .register("login_validation", schemas::user_login_validation())
            .build()
    }
}

pub async fn login(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let view = ViewSet::new(&state.registries.auth, LOGIN, &payload);
    let data = view.check_is_valid(ValidationOptions::default())?;

    let username = data.get("username").and_then(|v| v.as_str()).unwrap_or_default();
    let password = data.get("password").and_then(|v| v.as_str()).unwrap_or_default();
    let (_user, tokens) = state.auth.login(username, password).await?;

    Ok(view.respond(tokens.to_value(), None, StatusCode::OK))
}

pub async fn validate(State(state): State<AppState>, payload: Payload) -> ApiResult {
    ViewSet::new(&state.registries.auth, VALIDATE, &payload).validate()
}
