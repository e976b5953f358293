//! Recording protocol client for provider tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use neorpc_core::error::{ServiceError, TransportError};
use neorpc_core::request::{HttpRequest, RawResponse, RequestOptions};
use neorpc_core::transport::ProtocolClient;
use neorpc_core::ServiceContext;

#[derive(Default)]
pub(crate) struct Recorder {
    bodies: Mutex<HashMap<String, Value>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl Recorder {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn context(self: &Arc<Self>) -> ServiceContext {
        ServiceContext::new(self.clone())
    }

    /// Serve `body` with status 200 for `url`.
    pub(crate) fn respond(&self, url: &str, body: Value) {
        self.bodies.lock().unwrap().insert(url.to_string(), body);
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }

    /// Decoded JSON body of the last request.
    pub(crate) fn last_body(&self) -> Value {
        serde_json::from_str(self.last().body.as_deref().unwrap()).unwrap()
    }
}

#[async_trait]
impl ProtocolClient for Recorder {
    fn build_request_options(&self, options: &RequestOptions) -> Result<HttpRequest, ServiceError> {
        Ok(HttpRequest {
            method: options.method,
            url: options.url.clone(),
            headers: options.headers.clone(),
            body: options.body.as_ref().map(Value::to_string),
        })
    }

    async fn invoke(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let body = self.bodies.lock().unwrap().get(&request.url).cloned();
        let url = request.url.clone();
        self.seen.lock().unwrap().push(request);
        body.map(RawResponse::ok)
            .ok_or_else(|| TransportError::Status { status: 404, body: url })
    }
}
