//! NeoScan explorer REST API.

use neorpc_core::service::{RestCapable, RestService, ServiceConfig};
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture};

use crate::CurrentHeight;

#[derive(Debug, Clone)]
pub struct NeoScan {
    rest: RestService,
}

impl NeoScan {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            rest: RestService::named("neoScan", ctx, config),
        }
    }

    pub fn service_mut(&mut self) -> &mut RestService {
        &mut self.rest
    }

    pub fn get_current_block_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get("get_height", &[])
    }
}

impl RestCapable for NeoScan {
    fn rest(&self) -> &RestService {
        &self.rest
    }
}

impl CurrentHeight for NeoScan {
    fn current_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get_current_block_height()
    }
}
