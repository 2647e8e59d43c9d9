// viewset/mod.rs - Serializer dispatch for viewset actions
//
// Handlers build a `ViewSet` per request from their registry, the current
// action name and the request payload. Input is validated through the
// `<action>_validation` serializer, output is rendered through the serializer
// registered under the action name (or an explicit key).

pub mod pagination;
pub mod payload;
pub mod registry;

use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::serializers::{ErrorDetail, Serializer, SerializerContext};

pub use pagination::{Page, PageNumberPagination, Paginator};
pub use payload::{DataSource, Payload};
pub use registry::{validation_key, RegistryError, SerializerRegistry, DEFAULT_KEY};

/// Static description of a viewset: its serializers and the actions that
/// validate input.
pub trait ViewSetDefinition {
    const BASENAME: &'static str;

    /// Actions needing a `<action>_validation` serializer
    const VALIDATING_ACTIONS: &'static [&'static str];

    fn serializers() -> SerializerRegistry;

    /// Build the registry and check its wiring
    fn registry() -> Result<SerializerRegistry, RegistryError> {
        let registry = Self::serializers();
        registry.ensure_actions(Self::VALIDATING_ACTIONS)?;
        Ok(registry)
    }
}

/// Options of a validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Defaults to `<action>_validation`
    pub serializer_key: Option<String>,
    pub context: Map<String, Value>,
    pub many: bool,
}

impl ValidationOptions {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.serializer_key = Some(key.into());
        self
    }

    pub fn context(mut self, name: impl Into<String>, value: Value) -> Self {
        self.context.insert(name.into(), value);
        self
    }

    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }
}

/// Outcome of a failed validation run before flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Client input rejected by the serializer
    Invalid(ErrorDetail),
    /// Viewset and serializers are not wired correctly
    Misconfigured(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Invalid(detail) => match detail.flatten() {
                Ok(flat) => ApiError::validation(None).with_detail(flat),
                Err(e) => e.into(),
            },
            PipelineError::Misconfigured(message) => ApiError::configuration(message),
        }
    }
}

/// Per-request view over a viewset's registry
pub struct ViewSet<'a> {
    registry: &'a SerializerRegistry,
    action: &'a str,
    payload: &'a Payload,
    paginator: Option<&'a dyn Paginator>,
}

impl<'a> ViewSet<'a> {
    pub fn new(registry: &'a SerializerRegistry, action: &'a str, payload: &'a Payload) -> Self {
        Self {
            registry,
            action,
            payload,
            paginator: None,
        }
    }

    pub fn with_paginator(mut self, paginator: Option<&'a dyn Paginator>) -> Self {
        self.paginator = paginator;
        self
    }

    pub fn action(&self) -> &str {
        self.action
    }

    pub fn payload(&self) -> &Payload {
        self.payload
    }

    /// Serializer for `key`, or for the current action when no key is given
    pub fn get_serializer(&self, serializer_key: Option<&str>) -> &'a dyn Serializer {
        let key = serializer_key.unwrap_or(self.action);
        let serializer = self.registry.resolve(key);
        tracing::debug!(
            viewset = self.registry.viewset(),
            key,
            serializer = serializer.name(),
            "serializer resolved"
        );
        serializer
    }

    /// Validate the request data and return the validated data unflattened
    pub fn get_validated_data(&self, options: ValidationOptions) -> Result<Value, PipelineError> {
        let key = options
            .serializer_key
            .unwrap_or_else(|| validation_key(self.action));
        if !self.registry.contains(&key) {
            return Err(PipelineError::Misconfigured(format!(
                "You need to define '{}' serializer on viewset '{}'",
                key,
                self.registry.viewset()
            )));
        }

        let serializer = self.get_serializer(Some(&key));
        let validator = serializer.validator().ok_or_else(|| {
            PipelineError::Misconfigured(format!(
                "serializer '{}' registered as '{}' cannot validate input",
                serializer.name(),
                key
            ))
        })?;

        let (data, source) = self.payload.bound_data();
        tracing::debug!(key = %key, ?source, many = options.many, "validating request data");

        let ctx = SerializerContext {
            extra: options.context,
            ..SerializerContext::new(self.action).many(options.many)
        };
        validator.validate(&data, &ctx).map_err(PipelineError::Invalid)
    }

    /// Validated mapping, or a 422 carrying one message per invalid field
    pub fn check_is_valid(&self, options: ValidationOptions) -> Result<Map<String, Value>, ApiError> {
        match self.get_validated_data(options.many(false))? {
            Value::Object(data) => Ok(data),
            other => Err(ApiError::configuration(format!(
                "validator returned {} instead of a mapping",
                other
            ))),
        }
    }

    /// Validated list of mappings, or a 422 carrying per-item errors
    pub fn check_is_list_valid(&self, options: ValidationOptions) -> Result<Vec<Value>, ApiError> {
        match self.get_validated_data(options.many(true))? {
            Value::Array(items) => Ok(items),
            other => Err(ApiError::configuration(format!(
                "validator returned {} instead of a list",
                other
            ))),
        }
    }

    /// Render `data` (one item or a list) and wrap it with `status_code`
    pub fn respond(&self, data: Value, serializer_key: Option<&str>, status_code: StatusCode) -> ApiResponse {
        let rendered = self.get_serializer(serializer_key).render_data(&data);
        ApiResponse::with_status(rendered, status_code)
    }

    pub fn respond_created(&self, data: Value, serializer_key: Option<&str>) -> ApiResponse {
        self.respond(data, serializer_key, StatusCode::CREATED)
    }

    /// `POST <viewset>/validate/?action=<name>`: run `<name>_validation`
    /// against the request data and return the validated data, nothing else.
    pub fn validate(&self) -> ApiResult {
        let action = self
            .payload
            .query_param("action")
            .ok_or_else(|| ApiError::configuration("missing query parameter 'action'"))?;
        let data = self.check_is_valid(ValidationOptions::default().key(validation_key(action)))?;
        Ok(ApiResponse::success(Value::Object(data)))
    }

    pub fn paginator(&self) -> Option<&dyn Paginator> {
        self.paginator
    }

    /// One page of `items`, or `None` when pagination is disabled
    pub fn paginate_queryset(&self, items: Vec<Value>) -> Result<Option<Page>, ApiError> {
        match self.paginator {
            Some(paginator) => paginator.paginate_queryset(items, self.payload).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_paginated_response(&self, page: &Page, data: Value) -> ApiResult {
        let paginator = self
            .paginator
            .ok_or_else(|| ApiError::configuration("paginated response requested without a paginator"))?;
        Ok(ApiResponse::success(
            paginator.get_paginated_response(page, data, self.payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::serializers::{Field, Schema};
    use axum::http::Method;
    use serde_json::json;

    fn registry() -> SerializerRegistry {
        SerializerRegistry::builder("things")
            .register(
                "create_validation",
                Schema::new("ThingValidation")
                    .field(Field::char("name").min_length(3))
                    .field(Field::char("q").optional()),
            )
            .register(
                "create",
                Schema::new("ThingSerializer").field(Field::char("name")),
            )
            .build()
    }

    #[test]
    fn validates_with_derived_key() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/").with_body(json!({"name": "lamp"}));
        let view = ViewSet::new(&registry, "create", &payload);
        let data = view.check_is_valid(ValidationOptions::default()).unwrap();
        assert_eq!(Value::Object(data), json!({"name": "lamp"}));
    }

    #[test]
    fn invalid_input_is_flattened_422() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/").with_body(json!({"name": "x"}));
        let view = ViewSet::new(&registry, "create", &payload);
        let err = view.check_is_valid(ValidationOptions::default()).unwrap_err();
        assert_eq!(err.get_code(), 422);
        assert_eq!(
            err.to_json(),
            json!({"name": "Ensure this field has at least 3 characters."})
        );
    }

    #[test]
    fn query_params_are_used_when_body_is_empty() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/")
            .with_query("name", "from-query")
            .with_query("q", "x");
        let view = ViewSet::new(&registry, "create", &payload);
        let data = view.check_is_valid(ValidationOptions::default()).unwrap();
        assert_eq!(Value::Object(data), json!({"name": "from-query", "q": "x"}));
    }

    #[test]
    fn unregistered_validation_key_is_a_wiring_error() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/").with_body(json!({"name": "lamp"}));
        let view = ViewSet::new(&registry, "update", &payload);
        let err = view.get_validated_data(ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Misconfigured(ref m) if m.contains("update_validation")));
        let api_error: ApiError = err.into();
        assert_eq!(api_error.kind(), ErrorKind::Configuration);
        assert_eq!(api_error.get_code(), 500);
    }

    #[test]
    fn list_validation_returns_items() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/")
            .with_body(json!([{"name": "lamp"}, {"name": "desk"}]));
        let view = ViewSet::new(&registry, "create", &payload);
        let items = view.check_is_list_valid(ValidationOptions::default()).unwrap();
        assert_eq!(items.len(), 2);

        let payload = Payload::new(Method::POST, "/things/")
            .with_body(json!([{"name": "lamp"}, {"name": "x"}]));
        let view = ViewSet::new(&registry, "create", &payload);
        let err = view.check_is_list_valid(ValidationOptions::default()).unwrap_err();
        assert_eq!(
            err.to_json(),
            json!([{}, {"name": "Ensure this field has at least 3 characters."}])
        );
    }

    /// Accepts input only when the caller passes the expected owner
    struct OwnerCheck;

    impl crate::serializers::Validate for OwnerCheck {
        fn validate(&self, data: &Value, ctx: &SerializerContext) -> Result<Value, ErrorDetail> {
            match (data.get("owner"), ctx.extra.get("owner")) {
                (Some(owner), Some(expected)) if owner == expected => Ok(data.clone()),
                _ => Err(ErrorDetail::field("owner", ErrorDetail::message("Not your record."))),
            }
        }
    }

    impl Serializer for OwnerCheck {
        fn name(&self) -> &str {
            "OwnerCheck"
        }

        fn validator(&self) -> Option<&dyn crate::serializers::Validate> {
            Some(self)
        }
    }

    #[test]
    fn context_reaches_the_validator() {
        let registry = SerializerRegistry::builder("things")
            .register("update_validation", OwnerCheck)
            .build();
        let payload = Payload::new(Method::POST, "/things/").with_body(json!({"owner": "alice"}));
        let view = ViewSet::new(&registry, "update", &payload);

        let data = view
            .check_is_valid(ValidationOptions::default().context("owner", json!("alice")))
            .unwrap();
        assert_eq!(Value::Object(data), json!({"owner": "alice"}));

        let err = view
            .check_is_valid(ValidationOptions::default().context("owner", json!("bob")))
            .unwrap_err();
        assert_eq!(err.to_json(), json!({"owner": "Not your record."}));
    }

    #[test]
    fn respond_renders_through_action_serializer() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/");
        let view = ViewSet::new(&registry, "create", &payload);
        let response = view.respond_created(json!({"name": "lamp", "secret": 1}), None);
        assert_eq!(response.status_code, StatusCode::CREATED);
        assert_eq!(response.data, json!({"name": "lamp"}));

        let response = view.respond(json!([{"name": "a", "x": 1}]), None, StatusCode::OK);
        assert_eq!(response.data, json!([{"name": "a"}]));
    }

    #[test]
    fn respond_falls_back_to_pass_through() {
        let registry = registry();
        let payload = Payload::new(Method::GET, "/things/");
        let view = ViewSet::new(&registry, "retrieve", &payload);
        let response = view.respond(json!({"name": "lamp", "secret": 1}), None, StatusCode::OK);
        assert_eq!(response.data, json!({"name": "lamp", "secret": 1}));
    }

    #[test]
    fn validate_action_requires_action_param() {
        let registry = registry();
        let payload = Payload::new(Method::POST, "/things/validate/").with_body(json!({"name": "lamp"}));
        let view = ViewSet::new(&registry, "validate", &payload);
        assert_eq!(view.validate().unwrap_err().kind(), ErrorKind::Configuration);

        let payload = payload.with_query("action", "create");
        let view = ViewSet::new(&registry, "validate", &payload);
        assert_eq!(view.validate().unwrap().data, json!({"name": "lamp"}));
    }

    #[test]
    fn pagination_hook_is_optional() {
        let registry = registry();
        let payload = Payload::new(Method::GET, "/things/");
        let view = ViewSet::new(&registry, "list", &payload);
        assert!(view.paginate_queryset(vec![json!(1)]).unwrap().is_none());
        let page = Page {
            items: vec![],
            count: 0,
            number: 1,
            page_size: 10,
        };
        assert_eq!(
            view.get_paginated_response(&page, json!([])).unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }
}
