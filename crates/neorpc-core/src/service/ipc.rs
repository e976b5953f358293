//! IPC-style service kind: a bare `{method, params}` envelope.

use serde_json::{json, Value};

use super::{ServiceBase, ServiceConfig};
use crate::dispatch::{ServiceContext, ServiceFuture};
use crate::error::ServiceError;
use crate::request::{body_transform, HttpMethod, RequestOptions};

/// Sends `{method, params}` envelopes to the base URL and resolves with
/// the whole response body.
#[derive(Debug, Clone)]
pub struct IpcService {
    base: ServiceBase,
}

impl IpcService {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            base: ServiceBase::new("ipc", ctx, config.into()),
        }
    }

    pub fn base(&self) -> &ServiceBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    pub fn request(&self, method: &str, params: Vec<Value>) -> Result<ServiceFuture, ServiceError> {
        if method.is_empty() {
            return Err(ServiceError::Config("ipc method must not be empty".into()));
        }
        let options = RequestOptions::new(HttpMethod::Post, self.base.base_url())
            .with_body(json!({ "method": method, "params": params }))
            .with_transform_success(body_transform())
            .with_transform_error(body_transform());
        self.base.dispatch(options)
    }
}

/// Capability of speaking the IPC envelope.
pub trait IpcCapable {
    fn ipc(&self) -> &IpcService;

    fn send(&self, method: &str, params: Vec<Value>) -> Result<ServiceFuture, ServiceError> {
        self.ipc().request(method, params)
    }
}

impl IpcCapable for IpcService {
    fn ipc(&self) -> &IpcService {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RawResponse;
    use crate::test_support::MockClient;

    #[tokio::test]
    async fn sends_envelope_and_resolves_body() {
        let client = MockClient::new();
        client.respond("ipc://neo", RawResponse::ok(json!({"peers": 4})));
        let svc = IpcService::new(&ServiceContext::new(client.clone()), "ipc://neo");

        let value = svc.send("getpeers", vec![json!(true)]).unwrap().await.unwrap();
        assert_eq!(value, json!({"peers": 4}));

        let body: Value = serde_json::from_str(client.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"method": "getpeers", "params": [true]}));
    }

    #[test]
    fn empty_method_is_config_error() {
        let svc = IpcService::new(&ServiceContext::new(MockClient::new()), "ipc://neo");
        assert!(matches!(svc.send("", vec![]), Err(ServiceError::Config(_))));
    }
}
