// serializers/fields.rs - Declarative schemas built from typed fields
//
// Field rules follow the usual REST conventions: fields are required unless
// marked optional or given a default, strings are trimmed, and every failing
// rule of a field contributes a message.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

use super::{ErrorDetail, Render, Serializer, SerializerContext, Validate};
use crate::i18n::{gettext, interpolate, Params};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Clone)]
pub enum FieldKind {
    Char,
    Email,
    Integer,
    Boolean,
    Nested { schema: Arc<Schema>, many: bool },
}

#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub allow_blank: bool,
    pub allow_null: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub write_only: bool,
    pub read_only: bool,
    pub default: Option<Value>,
}

impl Field {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            allow_blank: false,
            allow_null: false,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            write_only: false,
            read_only: false,
            default: None,
        }
    }

    pub fn char(name: &str) -> Self {
        Self::new(name, FieldKind::Char)
    }

    pub fn email(name: &str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn nested(name: &str, schema: Schema, many: bool) -> Self {
        Self::new(
            name,
            FieldKind::Nested {
                schema: Arc::new(schema),
                many,
            },
        )
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    fn validate_value(&self, value: &Value) -> Result<Value, ErrorDetail> {
        if value.is_null() {
            return if self.allow_null {
                Ok(Value::Null)
            } else {
                Err(ErrorDetail::message(gettext("This field may not be null.")))
            };
        }

        match &self.kind {
            FieldKind::Char => self.validate_char(value).map_err(ErrorDetail::Messages),
            FieldKind::Email => {
                let cleaned = self.validate_char(value).map_err(ErrorDetail::Messages)?;
                match cleaned.as_str() {
                    Some(s) if s.is_empty() || is_valid_email(s) => Ok(cleaned),
                    _ => Err(ErrorDetail::message(gettext("Enter a valid email address."))),
                }
            }
            FieldKind::Integer => self.validate_integer(value).map_err(ErrorDetail::Messages),
            FieldKind::Boolean => parse_boolean(value)
                .map(Value::Bool)
                .ok_or_else(|| ErrorDetail::message(gettext("Must be a valid boolean."))),
            FieldKind::Nested { schema, many } => schema.validate_input(value, *many),
        }
    }

    fn validate_char(&self, value: &Value) -> Result<Value, Vec<String>> {
        let raw = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(vec![gettext("Not a valid string.")]),
        };
        let trimmed = raw.trim().to_string();

        if trimmed.is_empty() {
            if self.allow_blank {
                return Ok(Value::String(trimmed));
            }
            return Err(vec![gettext("This field may not be blank.")]);
        }

        let length = trimmed.chars().count();
        let mut messages = Vec::new();
        if let Some(max) = self.max_length.filter(|max| length > *max) {
            messages.push(interpolate(
                &gettext("Ensure this field has no more than %(max_length)d characters."),
                &Params::new().with("max_length", max),
            ));
        }
        if let Some(min) = self.min_length.filter(|min| length < *min) {
            messages.push(interpolate(
                &gettext("Ensure this field has at least %(min_length)d characters."),
                &Params::new().with("min_length", min),
            ));
        }

        if messages.is_empty() {
            Ok(Value::String(trimmed))
        } else {
            Err(messages)
        }
    }

    fn validate_integer(&self, value: &Value) -> Result<Value, Vec<String>> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let number = parsed.ok_or_else(|| vec![gettext("A valid integer is required.")])?;

        let mut messages = Vec::new();
        if let Some(max) = self.max_value.filter(|max| number > *max) {
            messages.push(interpolate(
                &gettext("Ensure this value is less than or equal to %(limit_value)s."),
                &Params::new().with("limit_value", max),
            ));
        }
        if let Some(min) = self.min_value.filter(|min| number < *min) {
            messages.push(interpolate(
                &gettext("Ensure this value is greater than or equal to %(limit_value)s."),
                &Params::new().with("limit_value", min),
            ));
        }

        if messages.is_empty() {
            Ok(Value::Number(Number::from(number)))
        } else {
            Err(messages)
        }
    }

    fn render_value(&self, value: &Value) -> Value {
        match &self.kind {
            FieldKind::Nested { schema, .. } => schema.render_data(value),
            _ => value.clone(),
        }
    }
}

/// An ordered set of fields validating and rendering JSON mappings
#[derive(Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate a single mapping, or a list of mappings when `many` is set
    pub fn validate_input(&self, data: &Value, many: bool) -> Result<Value, ErrorDetail> {
        if !many {
            return self.validate_object(data).map(Value::Object);
        }

        let items = match data {
            Value::Array(items) => items,
            other => {
                return Err(ErrorDetail::field(
                    NON_FIELD_ERRORS,
                    ErrorDetail::message(expected_list_message(other)),
                ))
            }
        };

        let mut validated = Vec::with_capacity(items.len());
        let mut errors = Vec::with_capacity(items.len());
        let mut failed = false;
        for item in items {
            match self.validate_object(item) {
                Ok(values) => {
                    validated.push(Value::Object(values));
                    errors.push(ErrorDetail::Fields(IndexMap::new()));
                }
                Err(detail) => {
                    failed = true;
                    errors.push(detail);
                }
            }
        }

        if failed {
            Err(ErrorDetail::Items(errors))
        } else {
            Ok(Value::Array(validated))
        }
    }

    fn validate_object(&self, data: &Value) -> Result<Map<String, Value>, ErrorDetail> {
        let input = match data {
            Value::Object(map) => map,
            other => {
                let message = interpolate(
                    &gettext("Invalid data. Expected a dictionary, but got %(datatype)s."),
                    &Params::new().with("datatype", python_type_name(other)),
                );
                return Err(ErrorDetail::field(NON_FIELD_ERRORS, ErrorDetail::message(message)));
            }
        };

        let mut validated = Map::new();
        let mut errors = IndexMap::new();

        for field in self.fields.iter().filter(|f| !f.read_only) {
            match input.get(&field.name) {
                Some(value) => match field.validate_value(value) {
                    Ok(clean) => {
                        validated.insert(field.name.clone(), clean);
                    }
                    Err(detail) => {
                        errors.insert(field.name.clone(), detail);
                    }
                },
                None if field.required => {
                    errors.insert(
                        field.name.clone(),
                        ErrorDetail::message(gettext("This field is required.")),
                    );
                }
                None => {
                    if let Some(default) = &field.default {
                        validated.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(ErrorDetail::Fields(errors))
        }
    }
}

impl Validate for Schema {
    fn validate(&self, data: &Value, ctx: &SerializerContext) -> Result<Value, ErrorDetail> {
        self.validate_input(data, ctx.many)
    }
}

impl Render for Schema {
    fn render(&self, item: &Value) -> Value {
        let Value::Object(input) = item else {
            return item.clone();
        };
        let mut out = Map::new();
        for field in self.fields.iter().filter(|f| !f.write_only) {
            if let Some(value) = input.get(&field.name) {
                out.insert(field.name.clone(), field.render_value(value));
            }
        }
        Value::Object(out)
    }
}

impl Serializer for Schema {
    fn name(&self) -> &str {
        &self.name
    }

    fn validator(&self) -> Option<&dyn Validate> {
        Some(self)
    }

    fn renderer(&self) -> Option<&dyn Render> {
        Some(self)
    }
}

fn expected_list_message(value: &Value) -> String {
    interpolate(
        &gettext("Expected a list of items but got type \"%(input_type)s\"."),
        &Params::new().with("input_type", python_type_name(value)),
    )
}

fn python_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').all(|label| !label.is_empty())
}
