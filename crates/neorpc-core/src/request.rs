//! Request and response types shared by services and protocol clients.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

/// A JSON-RPC 2.0 request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// HTTP verb of a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw response handed back by a protocol client.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Decoded body; `Value::Null` for an empty body.
    pub data: Value,
}

impl RawResponse {
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }
}

/// Maps a raw response to the value delivered to the caller.
pub type Transform = Arc<dyn Fn(&RawResponse) -> Value + Send + Sync>;

/// Transform returning the whole response body.
pub fn body_transform() -> Transform {
    Arc::new(|resp: &RawResponse| resp.data.clone())
}

/// Transform returning one top-level field of the body (`null` when absent).
pub fn field_transform(field: &'static str) -> Transform {
    Arc::new(move |resp: &RawResponse| resp.data.get(field).cloned().unwrap_or(Value::Null))
}

/// JavaScript-style truthiness of a transformed value.
///
/// `null`, `false`, `0` and `""` are falsy; arrays and objects are truthy
/// even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Transport-agnostic description of one service call.
#[derive(Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
    pub query_params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub transform_success: Option<Transform>,
    pub transform_error: Option<Transform>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            query_params: Vec::new(),
            headers: Vec::new(),
            transform_success: None,
            transform_error: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_transform_success(mut self, transform: Transform) -> Self {
        self.transform_success = Some(transform);
        self
    }

    pub fn with_transform_error(mut self, transform: Transform) -> Self {
        self.transform_error = Some(transform);
        self
    }

    /// Reject options that cannot describe a request.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.url.trim().is_empty() {
            return Err(ServiceError::Config(format!(
                "{} request has no url configured",
                self.method
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("query_params", &self.query_params)
            .field("headers", &self.headers)
            .field("transform_success", &self.transform_success.is_some())
            .field("transform_error", &self.transform_error.is_some())
            .finish()
    }
}

/// Concrete request built by a protocol client, reused verbatim on every
/// polling round.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL including the serialized query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<String>,
}
