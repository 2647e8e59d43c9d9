// handlers/mod.rs - Routes and viewset handlers
//
// Public:    GET /, GET /health, /auth/login/, /auth/validate/
// Protected: /users/* (JWT access token)

pub mod auth;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SecurityConfig;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", post(auth::login))
        .route("/auth/login", post(auth::login))
        .route("/auth/validate/", post(auth::validate))
        .route("/auth/validate", post(auth::validate))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/", get(users::list).post(users::create))
        .route("/users/bulk/", post(users::bulk_create))
        .route("/users/validate/", post(users::validate))
        .route("/users/:username", get(users::retrieve))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Global API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login/, /auth/validate/?action= (public)",
                "users": "/users/, /users/bulk/, /users/validate/?action=, /users/:username (protected)",
                "health": "/health (public)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
