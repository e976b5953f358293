//! antchain.xyz explorer REST API.

use neorpc_core::service::{RestCapable, RestService, ServiceConfig};
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture};

#[derive(Debug, Clone)]
pub struct AntChainXyz {
    rest: RestService,
}

impl AntChainXyz {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            rest: RestService::named("antChainXyz", ctx, config),
        }
    }

    pub fn service_mut(&mut self) -> &mut RestService {
        &mut self.rest
    }

    pub fn get_address_balance(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/info/{address}"), &[])
    }

    pub fn get_asset_transactions_by_address(&self, address: &str) -> Result<ServiceFuture, ServiceError> {
        self.get(&format!("address/utxo/{address}"), &[])
    }
}

impl RestCapable for AntChainXyz {
    fn rest(&self) -> &RestService {
        &self.rest
    }
}
