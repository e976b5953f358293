//! The `ProtocolClient` trait: the injected collaborator that performs the
//! actual network call.

use async_trait::async_trait;

use crate::error::{ServiceError, TransportError};
use crate::request::{HttpRequest, RawResponse, RequestOptions};

/// The transport every service dispatches through.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn ProtocolClient>`.
#[async_trait]
pub trait ProtocolClient: Send + Sync + 'static {
    /// Turn transport-agnostic options into a concrete request.
    ///
    /// Pure and synchronous. Called once per service call; polling reuses
    /// the result on every round.
    fn build_request_options(&self, options: &RequestOptions) -> Result<HttpRequest, ServiceError>;

    /// Perform one network call.
    async fn invoke(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str {
        "protocol-client"
    }
}
