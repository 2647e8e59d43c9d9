// serializers/detail.rs - Validation error trees and flattening
//
// Serializers report failures as a nested `ErrorDetail` tree. Before it
// reaches a client the tree is flattened so every invalid field carries
// exactly one message.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Nested validation errors as produced by a serializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// Per-field errors
    Fields(IndexMap<String, ErrorDetail>),
    /// Per-item errors for list input, in input order
    Items(Vec<ErrorDetail>),
    /// Candidate messages for a single field
    Messages(Vec<String>),
}

/// One message per field or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlatDetail {
    Fields(IndexMap<String, FlatDetail>),
    Items(Vec<FlatDetail>),
    Message(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("validation error leaf at '{0}' has no message")]
    EmptyLeaf(String),
}

impl ErrorDetail {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorDetail::Messages(vec![message.into()])
    }

    pub fn field(name: impl Into<String>, detail: ErrorDetail) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(name.into(), detail);
        ErrorDetail::Fields(fields)
    }

    /// Convert a framework-native JSON error tree.
    ///
    /// Objects whose keys are all array indices and whose values are all
    /// message lists (`{"0": [...], "1": [...]}`) are index-keyed errors of a
    /// single list field and collapse like a leaf. Any other object keeps its
    /// keys. Arrays of scalars are message lists; any other array is a list
    /// of items.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                if let Some(items) = index_keyed_items(map) {
                    return ErrorDetail::Items(items);
                }
                ErrorDetail::Fields(
                    map.iter()
                        .map(|(key, value)| (key.clone(), ErrorDetail::from_value(value)))
                        .collect(),
                )
            }
            Value::Array(values) if values.iter().all(is_scalar) => {
                ErrorDetail::Messages(values.iter().map(scalar_to_string).collect())
            }
            Value::Array(values) => {
                ErrorDetail::Items(values.iter().map(ErrorDetail::from_value).collect())
            }
            scalar => ErrorDetail::Messages(vec![scalar_to_string(scalar)]),
        }
    }

    /// Reduce the tree to one message per field or item
    pub fn flatten(&self) -> Result<FlatDetail, FlattenError> {
        flatten_at(self, "")
    }
}

fn flatten_at(detail: &ErrorDetail, path: &str) -> Result<FlatDetail, FlattenError> {
    match detail {
        ErrorDetail::Fields(fields) => {
            let mut flat = IndexMap::with_capacity(fields.len());
            for (name, errors) in fields {
                flat.insert(name.clone(), flatten_at(errors, &join(path, name))?);
            }
            Ok(FlatDetail::Fields(flat))
        }
        // Only the first element decides whether this is a list of per-item
        // field errors.
        ErrorDetail::Items(items) if matches!(items.first(), Some(ErrorDetail::Fields(_))) => {
            let mut flat = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                flat.push(flatten_at(item, &join(path, &index.to_string()))?);
            }
            Ok(FlatDetail::Items(flat))
        }
        leaf => first_message(leaf, path).map(FlatDetail::Message),
    }
}

fn first_message(detail: &ErrorDetail, path: &str) -> Result<String, FlattenError> {
    let empty = || FlattenError::EmptyLeaf(path.to_string());
    match detail {
        ErrorDetail::Messages(messages) => messages.first().cloned().ok_or_else(empty),
        ErrorDetail::Items(items) => first_message(items.first().ok_or_else(empty)?, path),
        ErrorDetail::Fields(fields) => {
            let (name, errors) = fields.first().ok_or_else(empty)?;
            first_message(errors, &join(path, name))
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn index_keyed_items(map: &serde_json::Map<String, Value>) -> Option<Vec<ErrorDetail>> {
    if map.is_empty() || !map.values().all(is_leaf) {
        return None;
    }
    let mut indexed = map
        .iter()
        .map(|(key, value)| key.parse::<usize>().ok().map(|index| (index, value)))
        .collect::<Option<Vec<_>>>()?;
    indexed.sort_by_key(|(index, _)| *index);
    Some(
        indexed
            .into_iter()
            .map(|(_, value)| ErrorDetail::from_value(value))
            .collect(),
    )
}

fn is_leaf(value: &Value) -> bool {
    match value {
        Value::Array(values) => values.iter().all(is_scalar),
        Value::Object(_) => false,
        _ => true,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FlatDetail {
    pub fn to_value(&self) -> Value {
        match self {
            FlatDetail::Fields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, detail)| (name.clone(), detail.to_value()))
                    .collect(),
            ),
            FlatDetail::Items(items) => Value::Array(items.iter().map(FlatDetail::to_value).collect()),
            FlatDetail::Message(message) => Value::String(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flatten_json(value: Value) -> Value {
        ErrorDetail::from_value(&value).flatten().unwrap().to_value()
    }

    #[test]
    fn index_keyed_field_collapses_to_first_message() {
        let flat = flatten_json(json!({"username": {"0": ["required"]}}));
        assert_eq!(flat, json!({"username": "required"}));
    }

    #[test]
    fn index_keyed_item_errors_keep_their_keys() {
        let flat = flatten_json(json!({"groups": {"1": {"name": ["required"]}}}));
        assert_eq!(flat, json!({"groups": {"1": {"name": "required"}}}));

        let flat = flatten_json(json!({"0": {"a": ["x"]}, "1": {"a": ["y", "z"]}}));
        assert_eq!(flat, json!({"0": {"a": "x"}, "1": {"a": "y"}}));
    }

    #[test]
    fn index_keyed_messages_use_lowest_index() {
        let flat = flatten_json(json!({"tags": {"2": ["late"], "0": ["first", "other"]}}));
        assert_eq!(flat, json!({"tags": "first"}));
    }

    #[test]
    fn list_of_item_errors_is_flattened_per_item() {
        let flat = flatten_json(json!([
            {"name": ["too short", "invalid chars"]},
            {"name": ["required"]}
        ]));
        assert_eq!(flat, json!([{"name": "too short"}, {"name": "required"}]));
    }

    #[test]
    fn leaf_keeps_only_first_message() {
        let a = flatten_json(json!({"password": ["too short", "too common"]}));
        let b = flatten_json(json!({"password": ["too short", "something else", "more"]}));
        assert_eq!(a, json!({"password": "too short"}));
        assert_eq!(a, b);
    }

    #[test]
    fn numeric_messages_are_stringified() {
        assert_eq!(flatten_json(json!({"code": [42]})), json!({"code": "42"}));
    }

    #[test]
    fn mapping_key_set_and_order_are_preserved() {
        let flat = flatten_json(json!({
            "zeta": ["z"],
            "alpha": ["a"],
            "nested": {"inner": ["i"], "other": ["o", "p"]}
        }));
        let keys: Vec<_> = flat.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "nested"]);
        assert_eq!(flat["nested"], json!({"inner": "i", "other": "o"}));
    }

    #[test]
    fn flattening_is_idempotent() {
        let once = flatten_json(json!({
            "username": ["required", "blank"],
            "groups": [{"name": ["too long"]}, {}]
        }));
        let twice = flatten_json(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn valid_items_stay_as_empty_mappings() {
        let flat = flatten_json(json!([{}, {"email": ["invalid"]}]));
        assert_eq!(flat, json!([{}, {"email": "invalid"}]));
    }

    #[test]
    fn empty_leaf_is_an_error() {
        let detail = ErrorDetail::field("username", ErrorDetail::Messages(vec![]));
        assert_eq!(
            detail.flatten(),
            Err(FlattenError::EmptyLeaf("username".to_string()))
        );

        let nested = ErrorDetail::from_value(&json!({"groups": [{"name": []}]}));
        assert_eq!(
            nested.flatten(),
            Err(FlattenError::EmptyLeaf("groups.0.name".to_string()))
        );
    }

    #[test]
    fn empty_list_is_an_error() {
        let detail = ErrorDetail::from_value(&json!({"tags": []}));
        assert!(matches!(detail.flatten(), Err(FlattenError::EmptyLeaf(path)) if path == "tags"));
    }
}
