// serializers/mod.rs - Serializer capabilities
//
// A serializer may validate raw input, render domain data, both, or
// neither. `PassThrough` is the null serializer every registry falls back to.

pub mod detail;
pub mod fields;
pub mod schemas;

use serde_json::{Map, Value};

pub use detail::{ErrorDetail, FlatDetail, FlattenError};
pub use fields::{Field, Schema};

/// Per-call information handed to a validator
#[derive(Debug, Clone, Default)]
pub struct SerializerContext {
    /// Action being invoked on the viewset
    pub action: String,
    /// Validate a list of items instead of a single mapping
    pub many: bool,
    /// Caller supplied values, e.g. the authenticated user
    pub extra: Map<String, Value>,
}

impl SerializerContext {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Raw input -> validated structured data
pub trait Validate: Send + Sync {
    fn validate(&self, data: &Value, ctx: &SerializerContext) -> Result<Value, ErrorDetail>;
}

/// Structured domain data -> wire-ready data, one item at a time
pub trait Render: Send + Sync {
    fn render(&self, item: &Value) -> Value;
}

pub trait Serializer: Send + Sync {
    /// Name for logging and wiring errors
    fn name(&self) -> &str;

    fn validator(&self) -> Option<&dyn Validate> {
        None
    }

    fn renderer(&self) -> Option<&dyn Render> {
        None
    }

    /// Render a single item or, for arrays, every item in order.
    /// Serializers without a renderer return the data unchanged.
    fn render_data(&self, data: &Value) -> Value {
        match (self.renderer(), data) {
            (None, _) => data.clone(),
            (Some(renderer), Value::Array(items)) => {
                Value::Array(items.iter().map(|item| renderer.render(item)).collect())
            }
            (Some(renderer), item) => renderer.render(item),
        }
    }
}

/// Null serializer: renders data unchanged and cannot validate
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Render for PassThrough {
    fn render(&self, item: &Value) -> Value {
        item.clone()
    }
}

impl Serializer for PassThrough {
    fn name(&self) -> &str {
        "PassThrough"
    }

    fn renderer(&self) -> Option<&dyn Render> {
        Some(self)
    }
}
