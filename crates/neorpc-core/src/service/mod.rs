//! Service kinds and the capability traits providers implement.
//!
//! - [`RpcService`] / [`RpcCapable`]: JSON-RPC 2.0 over HTTP POST
//! - [`IpcService`] / [`IpcCapable`]: `{method, params}` envelope
//! - [`RestService`] / [`RestCapable`]: verbs relative to a base URL

pub mod ipc;
pub mod rest;
pub mod rpc;

pub use ipc::{IpcCapable, IpcService};
pub use rest::{RestCapable, RestService, RestTransforms};
pub use rpc::{RpcCapable, RpcService};

use serde::Deserialize;

use crate::dispatch::{RequestDispatcher, ServiceContext, ServiceFuture};
use crate::error::ServiceError;
use crate::poll::PollConfig;
use crate::request::RequestOptions;
use crate::timer::IntervalConfig;

/// Per-service settings.
///
/// ```json
/// { "baseUrl": "http://localhost:10332", "poll": 5000 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Poll every service call with this interval instead of firing once.
    #[serde(default)]
    pub poll: Option<IntervalConfig>,
}

impl ServiceConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            poll: None,
        }
    }
}

impl From<&str> for ServiceConfig {
    fn from(base_url: &str) -> Self {
        Self::with_base_url(base_url)
    }
}

impl From<String> for ServiceConfig {
    fn from(base_url: String) -> Self {
        Self::with_base_url(base_url)
    }
}

/// State shared by every service kind: name, base URL, poll setting and
/// the dispatcher requests go through.
#[derive(Debug, Clone)]
pub struct ServiceBase {
    name: String,
    base_url: String,
    poll: Option<PollConfig>,
    dispatcher: RequestDispatcher,
}

impl ServiceBase {
    pub fn new(name: impl Into<String>, ctx: &ServiceContext, config: ServiceConfig) -> Self {
        Self {
            name: name.into(),
            base_url: config.base_url.unwrap_or_default(),
            poll: config.poll.map(PollConfig::Options),
            dispatcher: ctx.dispatcher(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll(&self) -> Option<&PollConfig> {
        self.poll.as_ref()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Poll every subsequent call with `poll`.
    pub fn with_poll(mut self, poll: impl Into<PollConfig>) -> Self {
        self.poll = Some(poll.into());
        self
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Change or clear the poll setting for subsequent calls.
    pub fn set_poll(&mut self, poll: Option<PollConfig>) {
        self.poll = poll;
    }

    pub fn dispatch(&self, options: RequestOptions) -> Result<ServiceFuture, ServiceError> {
        tracing::trace!(service = %self.name, url = %options.url, "service call");
        self.dispatcher.dispatch(options, self.poll.as_ref())
    }
}
