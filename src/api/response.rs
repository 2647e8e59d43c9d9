use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

/// Rendered body plus status code. The body is sent as-is, without envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
    pub status_code: StatusCode,
}

impl ApiResponse {
    /// Create a successful API response with default 200 status
    pub fn success(data: Value) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    /// Create an API response with custom status code
    pub fn with_status(data: Value, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        // For 204 No Content, return empty response
        if self.status_code == StatusCode::NO_CONTENT {
            return self.status_code.into_response();
        }
        (self.status_code, Json(self.data)).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
