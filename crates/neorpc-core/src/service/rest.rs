//! REST service kind: verbs against paths relative to a base URL.

use serde_json::Value;

use super::{ServiceBase, ServiceConfig};
use crate::dispatch::{ServiceContext, ServiceFuture};
use crate::error::ServiceError;
use crate::request::{body_transform, HttpMethod, RequestOptions, Transform};

/// Per-call overrides of the success and error transforms.
///
/// Unset fields fall back to the whole response body.
#[derive(Clone, Default)]
pub struct RestTransforms {
    pub success: Option<Transform>,
    pub error: Option<Transform>,
}

impl RestTransforms {
    pub fn success(transform: Transform) -> Self {
        Self {
            success: Some(transform),
            error: None,
        }
    }

    pub fn with_error(mut self, transform: Transform) -> Self {
        self.error = Some(transform);
        self
    }
}

/// Issues HTTP verbs against `base_url + path`.
#[derive(Debug, Clone)]
pub struct RestService {
    base: ServiceBase,
}

impl RestService {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self::named("rest", ctx, config)
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

    /// Send one request to `path`, which is appended to the base URL as-is.
    pub fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
        transforms: RestTransforms,
    ) -> Result<ServiceFuture, ServiceError> {
        if path.is_empty() {
            return Err(ServiceError::Config(format!("{method} request has an empty path")));
        }

        let mut options = RequestOptions::new(method, format!("{}{path}", self.base.base_url()))
            .with_transform_success(transforms.success.unwrap_or_else(body_transform))
            .with_transform_error(transforms.error.unwrap_or_else(body_transform));
        if let Some(body) = body {
            options = options.with_body(body);
        }
        for (key, value) in query {
            options = options.with_query(*key, *value);
        }
        self.base.dispatch(options)
    }
}

/// Capability of speaking REST.
pub trait RestCapable {
    fn rest(&self) -> &RestService;

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ServiceFuture, ServiceError> {
        self.get_with(path, query, RestTransforms::default())
    }

    /// `get` with custom transforms.
    fn get_with(
        &self,
        path: &str,
        query: &[(&str, &str)],
        transforms: RestTransforms,
    ) -> Result<ServiceFuture, ServiceError> {
        self.rest().send(HttpMethod::Get, path, None, query, transforms)
    }

    fn post(&self, path: &str, body: Value, query: &[(&str, &str)]) -> Result<ServiceFuture, ServiceError> {
        self.rest()
            .send(HttpMethod::Post, path, Some(body), query, RestTransforms::default())
    }

    fn put(&self, path: &str, body: Value, query: &[(&str, &str)]) -> Result<ServiceFuture, ServiceError> {
        self.rest()
            .send(HttpMethod::Put, path, Some(body), query, RestTransforms::default())
    }

    fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<ServiceFuture, ServiceError> {
        self.rest()
            .send(HttpMethod::Delete, path, None, query, RestTransforms::default())
    }
}

impl RestCapable for RestService {
    fn rest(&self) -> &RestService {
        self
    }
}
