//! JSON-RPC 2.0 service kind.

use serde_json::Value;

use super::{ServiceBase, ServiceConfig};
use crate::dispatch::{ServiceContext, ServiceFuture};
use crate::error::ServiceError;
use crate::request::{field_transform, HttpMethod, JsonRpcRequest, RequestOptions};

/// Posts JSON-RPC 2.0 requests to the base URL.
///
/// Resolves with `result` from the response body; a missing or falsy
/// `result` next to a non-null `error` rejects with that error object.
#[derive(Debug, Clone)]
pub struct RpcService {
    base: ServiceBase,
}

impl RpcService {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self::named("rpc", ctx, config)
    }

    pub fn named(name: &str, ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            base: ServiceBase::new(name, ctx, config.into()),
        }
    }

    pub fn base(&self) -> &ServiceBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    /// Send `method` with positional `params`.
    pub fn request(&self, method: &str, params: Vec<Value>) -> Result<ServiceFuture, ServiceError> {
        if method.is_empty() {
            return Err(ServiceError::Config("rpc method must not be empty".into()));
        }
        let body = serde_json::to_value(JsonRpcRequest::new(1, method, params))
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        let options = RequestOptions::new(HttpMethod::Post, self.base.base_url())
            .with_body(body)
            .with_transform_success(field_transform("result"))
            .with_transform_error(field_transform("error"));
        self.base.dispatch(options)
    }
}

/// Capability of speaking JSON-RPC.
pub trait RpcCapable {
    fn rpc(&self) -> &RpcService;

    fn call(&self, method: &str, params: Vec<Value>) -> Result<ServiceFuture, ServiceError> {
        self.rpc().request(method, params)
    }
}

impl RpcCapable for RpcService {
    fn rpc(&self) -> &RpcService {
        self
    }
}
