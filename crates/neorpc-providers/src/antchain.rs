//! AntChain block explorer REST API.

use neorpc_core::service::{RestCapable, RestService, ServiceConfig};
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture};

use crate::CurrentHeight;

pub const ANTCHAIN_URL: &str = "http://www.antchain.org/api/v1/";

#[derive(Debug, Clone)]
pub struct AntChain {
    rest: RestService,
}

impl AntChain {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            rest: RestService::named("antChain", ctx, config),
        }
    }

    pub fn service_mut(&mut self) -> &mut RestService {
        &mut self.rest
    }

    // Block

    pub fn get_block_by_hash(&self, hash: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("block/get_block/{hash}"), &[])
    }

    pub fn get_block_by_height(&self, height: u64) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("block/get_block/{height}"), &[])
    }

    pub fn get_current_block(&self) -> Result<ServiceFuture, ServiceError> {
        self.get("block/get_current_block", &[])
    }

    pub fn get_current_block_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get("block/get_current_height", &[])
    }

    // Address

    pub fn get_address_balance(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/get_value/{address}"), &[])
    }

    pub fn get_unspent_coins_by_address(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/get_unspent/{address}"), &[])
    }

    // Tx

    pub fn get_transaction_by_txid(&self, txid: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("tx/get_tx/{txid}"), &[])
    }
}

impl RestCapable for AntChain {
    fn rest(&self) -> &RestService {
        &self.rest
    }
}

impl CurrentHeight for AntChain {
    fn current_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get_current_block_height()
    }
}
