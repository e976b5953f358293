//! neorpc-providers — NEO node and explorer API profiles.
//!
//! Each provider wraps one service kind and exposes the endpoints of a
//! specific API as typed methods.
//!
//! # Quick start
//! ```rust,no_run
//! use neorpc_providers::{http_context, node::NeoNode};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = http_context()?;
//! let height = NeoNode::local(&ctx).get_block_count()?.await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use neorpc_core::service::ServiceConfig;
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture, TransportError};
use neorpc_http::{HttpClientConfig, HttpProtocolClient};

pub mod antchain;
pub mod antchain_xyz;
pub mod neon;
pub mod neoscan;
pub mod node;

#[cfg(test)]
mod test_support;

pub use antchain::AntChain;
pub use antchain_xyz::AntChainXyz;
pub use neon::Neon;
pub use neoscan::NeoScan;
pub use node::NeoNode;

/// Providers that can report the current chain height.
pub trait CurrentHeight: Send + Sync {
    fn current_height(&self) -> Result<ServiceFuture, ServiceError>;
}

/// Service context backed by the default HTTP client.
pub fn http_context() -> Result<ServiceContext, TransportError> {
    http_context_with(HttpClientConfig::default())
}

pub fn http_context_with(config: HttpClientConfig) -> Result<ServiceContext, TransportError> {
    Ok(ServiceContext::new(Arc::new(HttpProtocolClient::new(config)?)))
}

/// Known provider profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Node,
    AntChain,
    AntChainXyz,
    NeoScan,
    Neon,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Node,
        ProviderKind::AntChain,
        ProviderKind::AntChainXyz,
        ProviderKind::NeoScan,
        ProviderKind::Neon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::AntChain => "antchain",
            Self::AntChainXyz => "antchain-xyz",
            Self::NeoScan => "neoscan",
            Self::Neon => "neon",
        }
    }

    /// `"rpc"` or `"rest"`.
    pub fn service_kind(&self) -> &'static str {
        match self {
            Self::Node => "rpc",
            _ => "rest",
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Node => Some(node::LOCAL_NODE_URL),
            Self::AntChain => Some(antchain::ANTCHAIN_URL),
            _ => None,
        }
    }

    /// Build a height source for this provider, if it has one.
    pub fn height_source(
        &self,
        ctx: &ServiceContext,
        config: ServiceConfig,
    ) -> Option<Box<dyn CurrentHeight>> {
        match self {
            Self::Node => Some(Box::new(NeoNode::new(ctx, config))),
            Self::AntChain => Some(Box::new(AntChain::new(ctx, config))),
            Self::NeoScan => Some(Box::new(NeoScan::new(ctx, config))),
            Self::Neon => Some(Box::new(Neon::new(ctx, config))),
            Self::AntChainXyz => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || kind.name().replace('-', "") == wanted)
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}
