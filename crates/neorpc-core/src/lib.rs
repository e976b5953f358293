//! neorpc-core — services, extended futures and the polling engine.
//!
//! # Overview
//!
//! A service call is described by [`RequestOptions`], turned into a concrete
//! request by a [`ProtocolClient`] and handed back to the caller as an
//! [`ExtendedFuture`]. One-shot calls resolve or reject once. Polled calls
//! are grouped by [`PollingPolicy`] onto a [`PollRunner`] that repeats them
//! on an [`IntervalTimer`] and reports each round through `notify`.
//!
//! - [`service`]: RPC, IPC and REST service kinds plus capability traits
//! - [`poll`]: policies, runners and the registry that coalesces them
//! - [`dispatch`]: [`ServiceContext`] and [`RequestDispatcher`]
//! - [`error`]: [`TransportError`] and [`ServiceError`]

pub mod dispatch;
pub mod error;
pub mod future;
pub mod poll;
pub mod request;
pub mod service;
pub mod timer;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use dispatch::{RequestDispatcher, ServiceContext, ServiceFuture};
pub use error::{ServiceError, TransportError};
pub use future::{deferred, Deferred, ExtendedFuture, PollControl};
pub use poll::{AttemptOutcome, PollConfig, PollRegistry, PollRunner, PollingPolicy, RequestFactory};
pub use request::{
    body_transform, field_transform, is_truthy, HttpMethod, HttpRequest, JsonRpcRequest, RawResponse,
    RequestOptions, Transform,
};
pub use service::{
    IpcCapable, IpcService, RestCapable, RestService, RestTransforms, RpcCapable, RpcService, ServiceBase,
    ServiceConfig,
};
pub use timer::{IntervalConfig, IntervalTimer, DEFAULT_ERROR_INTERVAL, DEFAULT_INTERVAL, MIN_INTERVAL};
pub use transport::ProtocolClient;
