// viewset/payload.rs - Inbound request data for a viewset action

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::Method,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Which request part a serializer was bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Body,
    QueryParams,
}

/// Method, path, parsed JSON body and query parameters of a request
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: IndexMap<String, String>,
}

impl Payload {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: IndexMap::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// `null`, `false`, zero and empty strings, lists or mappings
    pub fn is_body_empty(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::String(s)) => s.is_empty(),
        }
    }

    /// Data a serializer is bound to: the body, unless it is empty and query
    /// parameters are present. Only one source is ever used.
    pub fn bound_data(&self) -> (Value, DataSource) {
        if self.is_body_empty() && !self.query.is_empty() {
            let params: Map<String, Value> = self
                .query
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            return (Value::Object(params), DataSource::QueryParams);
        }
        let body = self
            .body
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        (body, DataSource::Body)
    }
}

fn parse_query(query: &str) -> IndexMap<String, String> {
    // Repeated names keep the last value
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect()
}

fn parse_body(bytes: &[u8]) -> Result<Option<Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some).map_err(|e| {
        ApiError::bad_request(Some(&format!("JSON parse error - {}", e)))
    })
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(parse_query).unwrap_or_default();

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::generic(Some(&rejection.body_text()), None, Some(rejection.status().as_u16()))
        })?;
        let body = parse_body(&bytes)?;

        tracing::debug!(%method, %path, has_body = body.is_some(), query_params = query.len(), "payload extracted");
        Ok(Self {
            method,
            path,
            body,
            query,
        })
    }
}
