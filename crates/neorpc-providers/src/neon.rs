//! Neon wallet API.

use std::sync::Arc;

use serde_json::{json, Value};

use neorpc_core::request::RawResponse;
use neorpc_core::service::{RestCapable, RestService, RestTransforms, ServiceConfig};
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture};

use crate::CurrentHeight;

#[derive(Debug, Clone)]
pub struct Neon {
    rest: RestService,
}

impl Neon {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            rest: RestService::named("neon", ctx, config),
        }
    }

    pub fn service_mut(&mut self) -> &mut RestService {
        &mut self.rest
    }

    /// Resolves with `{"height": <block_height>}`.
    pub fn get_current_block_height(&self) -> Result<ServiceFuture, ServiceError> {
        let transforms = RestTransforms::success(Arc::new(height_from_block_height));
        self.get_with("block/height", &[], transforms)
    }

    pub fn get_address_balance(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/balance/{address}"), &[])
    }

    pub fn get_asset_transactions_by_address(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/history/{address}"), &[])
    }

    pub fn get_transaction_by_txid(&self, txid: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("transaction/{txid}"), &[])
    }
}

fn height_from_block_height(resp: &RawResponse) -> Value {
    let height = resp.data.get("block_height").cloned().unwrap_or(Value::Null);
    json!({ "height": height })
}

impl RestCapable for Neon {
    fn rest(&self) -> &RestService {
        &self.rest
    }
}

impl CurrentHeight for Neon {
    fn current_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get_current_block_height()
    }
}
