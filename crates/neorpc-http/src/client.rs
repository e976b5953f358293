//! HTTP protocol client backed by `reqwest`.
//!
//! Builds one [`HttpRequest`] per service call (query string encoded with
//! `url`, JSON body serialized up front) and executes it on every attempt.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use neorpc_core::error::{ServiceError, TransportError};
use neorpc_core::request::{HttpMethod, HttpRequest, RawResponse, RequestOptions};
use neorpc_core::transport::ProtocolClient;

/// Configuration for [`HttpProtocolClient`].
///
/// ```json
/// { "timeoutMs": 30000, "userAgent": "neorpc/0.1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpClientConfig {
    pub timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

/// Protocol client speaking JSON over HTTP.
pub struct HttpProtocolClient {
    http: reqwest::Client,
    timeout_ms: u64,
}

impl HttpProtocolClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(HttpClientConfig::default())
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout { ms: self.timeout_ms }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl std::fmt::Debug for HttpProtocolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProtocolClient")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Append `params` to `url` as an encoded query string.
fn with_query(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

/// Empty body → `null`, JSON → parsed, anything else → string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl ProtocolClient for HttpProtocolClient {
    fn build_request_options(&self, options: &RequestOptions) -> Result<HttpRequest, ServiceError> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(options.headers.iter().cloned());
        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        Ok(HttpRequest {
            method: options.method,
            url: with_query(&options.url, &options.query_params),
            headers,
            body,
        })
    }

    async fn invoke(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.http.request(to_reqwest(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if !(200..300).contains(&status) {
            tracing::debug!(url = %request.url, status, "non-success status");
            return Err(TransportError::Status { status, body: text });
        }

        Ok(RawResponse {
            status,
            data: decode_body(&text),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
