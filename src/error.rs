// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::i18n::{gettext, interpolate, Params};
use crate::serializers::FlatDetail;

/// Kinds of typed failures surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // 400 Bad Request, overridable status
    Generic,
    // 400 Bad Request
    BadRequest,
    // 401 Unauthorized
    InvalidCredentials,
    // 403 Forbidden
    AuthenticationTimeout,
    AccessForbidden,
    // 404 Not Found
    NotFound,
    // 409 Conflict
    AlreadyExists,
    // 422 Unprocessable Entity
    Validation,
    // 503 Service Unavailable
    ServiceUnavailable,
    // 500, wiring defect between a viewset and its serializers
    Configuration,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Generic => 400,
            ErrorKind::BadRequest => 400,
            ErrorKind::InvalidCredentials => 401,
            ErrorKind::AuthenticationTimeout => 403,
            ErrorKind::AccessForbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::Validation => 422,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Configuration => 500,
        }
    }

    /// Untranslated message used when no override is given
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "message undefined",
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::InvalidCredentials => "Invalid Credentials",
            ErrorKind::AuthenticationTimeout => "Authentication Timeout",
            ErrorKind::AccessForbidden => "Access Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::AlreadyExists => "Already Exists",
            ErrorKind::Validation => "Unprocessable Entity",
            ErrorKind::ServiceUnavailable => "Service temporarily unavailable, try again later.",
            ErrorKind::Configuration => "Internal Server Error",
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "ERROR",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::AuthenticationTimeout => "AUTHENTICATION_TIMEOUT",
            ErrorKind::AccessForbidden => "ACCESS_FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Validation => "UNPROCESSABLE_ENTITY",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Configuration => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Typed API failure: kind, status code, localized message and, for
/// validation failures, the flattened field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    code: u16,
    message: String,
    detail: Option<FlatDetail>,
}

impl ApiError {
    /// Translate the template (or the kind's default), then interpolate `params`
    pub fn new(kind: ErrorKind, message: Option<&str>, params: Option<&Params>) -> Self {
        let template = gettext(message.unwrap_or(kind.default_message()));
        let message = match params {
            Some(params) => interpolate(&template, params),
            None => interpolate(&template, &Params::new()),
        };
        Self {
            kind,
            code: kind.status_code(),
            message,
            detail: None,
        }
    }

    /// Base kind; the only one whose status code can be overridden
    pub fn generic(message: Option<&str>, params: Option<&Params>, code: Option<u16>) -> Self {
        let mut error = Self::new(ErrorKind::Generic, message, params);
        if let Some(code) = code {
            error.code = code;
        }
        error
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn get_code(&self) -> u16 {
        self.code
    }

    pub fn get_message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&FlatDetail> {
        self.detail.as_ref()
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match (&self.kind, &self.detail) {
            (ErrorKind::Validation, Some(detail)) => detail.to_value(),
            _ => json!({
                "success": false,
                "error": self.message,
                "code": self.kind.error_code()
            }),
        }
    }
}

// Static constructor methods, one per kind
impl ApiError {
    pub fn invalid_credentials(message: Option<&str>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message, None)
    }

    pub fn not_found(message: &str, params: Option<&Params>) -> Self {
        Self::new(ErrorKind::NotFound, Some(message), params)
    }

    pub fn already_exists(message: &str, params: Option<&Params>) -> Self {
        Self::new(ErrorKind::AlreadyExists, Some(message), params)
    }

    /// Validation failure; callers attach the flattened errors with `with_detail`
    pub fn validation(params: Option<&Params>) -> Self {
        Self::new(ErrorKind::Validation, None, params)
    }

    pub fn with_detail(mut self, detail: FlatDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn authentication_timeout(message: Option<&str>) -> Self {
        Self::new(ErrorKind::AuthenticationTimeout, message, None)
    }

    pub fn access_forbidden(message: Option<&str>) -> Self {
        Self::new(ErrorKind::AccessForbidden, message, None)
    }

    pub fn bad_request(message: Option<&str>) -> Self {
        Self::new(ErrorKind::BadRequest, message, None)
    }

    pub fn service_unavailable(message: Option<&str>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message, None)
    }

    /// Wiring defect. The message is logged, never translated or shown.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            code: ErrorKind::Configuration.status_code(),
            message: message.into(),
            detail: None,
        }
    }
}

impl From<crate::serializers::FlattenError> for ApiError {
    fn from(err: crate::serializers::FlattenError) -> Self {
        ApiError::configuration(err.to_string())
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        ApiError::configuration(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.kind == ErrorKind::Configuration {
            tracing::error!("Configuration error: {}", self.message);
            let body = json!({
                "success": false,
                "error": gettext(ErrorKind::Configuration.default_message()),
                "code": ErrorKind::Configuration.error_code()
            });
            return (status, Json(body)).into_response();
        }

        (status, Json(self.to_json())).into_response()
    }
}
