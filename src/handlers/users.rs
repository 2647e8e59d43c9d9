// handlers/users.rs - Account viewset (JWT protected)
//
// GET  /users/            list, paginated when configured
// POST /users/            create
// POST /users/bulk/       create several accounts at once
// GET  /users/:username   retrieve
// POST /users/validate/   dry-run validation

use axum::extract::{Path, State};
use axum::Extension;
use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

use crate::api::ApiResult;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::serializers::{schemas, Serializer};
use crate::state::AppState;
use crate::types::UserIdentity;
use crate::viewset::{Paginator, Payload, SerializerRegistry, ValidationOptions, ViewSet, ViewSetDefinition};

pub const LIST: &str = "list";
pub const RETRIEVE: &str = "retrieve";
pub const CREATE: &str = "create";
pub const BULK_CREATE: &str = "bulk_create";
pub const VALIDATE: &str = "validate";

pub struct UserViewSet;

impl ViewSetDefinition for UserViewSet {
    const BASENAME: &'static str = "users";
    const VALIDATING_ACTIONS: &'static [&'static str] = &[CREATE, BULK_CREATE];

    fn serializers() -> SerializerRegistry {
        let user: Arc<dyn Serializer> = Arc::new(schemas::user_serializer());
        let user_create: Arc<dyn Serializer> = Arc::new(schemas::user_create_validation());
        SerializerRegistry::builder(Self::BASENAME)
            .register_shared(&[LIST, RETRIEVE, CREATE, BULK_CREATE], user)
            .register_shared(&["create_validation", "bulk_create_validation"], user_create)
            .build()
    }
}

fn to_values(users: &[UserIdentity]) -> Result<Vec<Value>, ApiError> {
    users
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| ApiError::configuration(format!("failed to serialize users: {}", e)))
}

fn paginator(state: &AppState) -> Option<&dyn Paginator> {
    state.paginator.as_deref().map(|p| p as &dyn Paginator)
}

pub async fn list(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let view = ViewSet::new(&state.registries.users, LIST, &payload).with_paginator(paginator(&state));
    let users = to_values(&state.users.list().await)?;
    let Some(paginator) = view.paginator() else {
        return Ok(view.respond(Value::Array(users), None, StatusCode::OK));
    };

    let mut page = paginator.paginate_queryset(users, &payload)?;
    let rendered = view
        .get_serializer(None)
        .render_data(&Value::Array(std::mem::take(&mut page.items)));
    view.get_paginated_response(&page, rendered)
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Payload,
) -> ApiResult {
    let view = ViewSet::new(&state.registries.users, RETRIEVE, &payload);
    let user = state.users.retrieve(&username).await?;
    let data = serde_json::to_value(&user)
        .map_err(|e| ApiError::configuration(format!("failed to serialize user: {}", e)))?;
    Ok(view.respond(data, None, StatusCode::OK))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Payload,
) -> ApiResult {
    let view = ViewSet::new(&state.registries.users, CREATE, &payload);
    let data = view.check_is_valid(ValidationOptions::default())?;
    let user = state.users.create(data).await?;
    tracing::info!(username = %user.username, created_by = %auth_user.username, "user created");
    let data = serde_json::to_value(&user)
        .map_err(|e| ApiError::configuration(format!("failed to serialize user: {}", e)))?;
    Ok(view.respond_created(data, None))
}

pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Payload,
) -> ApiResult {
    let view = ViewSet::new(&state.registries.users, BULK_CREATE, &payload);
    let items = view.check_is_list_valid(ValidationOptions::default())?;
    let users = state.users.bulk_create(items).await?;
    tracing::info!(count = users.len(), created_by = %auth_user.username, "users created");
    Ok(view.respond_created(Value::Array(to_values(&users)?), None))
}

pub async fn validate(State(state): State<AppState>, payload: Payload) -> ApiResult {
    ViewSet::new(&state.registries.users, VALIDATE, &payload).validate()
}
