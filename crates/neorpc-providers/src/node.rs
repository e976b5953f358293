//! NEO full node, spoken to over JSON-RPC.
//!
//! Default endpoint is a local node on `http://localhost:10332`.

use serde_json::{json, Value};

use neorpc_core::service::{RpcCapable, RpcService, ServiceConfig};
use neorpc_core::{ServiceContext, ServiceError, ServiceFuture};

use crate::CurrentHeight;

pub const LOCAL_NODE_URL: &str = "http://localhost:10332";

/// JSON-RPC client for a NEO node.
#[derive(Debug, Clone)]
pub struct NeoNode {
    rpc: RpcService,
}

impl NeoNode {
    pub fn new(ctx: &ServiceContext, config: impl Into<ServiceConfig>) -> Self {
        Self {
            rpc: RpcService::named("node", ctx, config),
        }
    }

    /// Node at [`LOCAL_NODE_URL`].
    pub fn local(ctx: &ServiceContext) -> Self {
        Self::new(ctx, LOCAL_NODE_URL)
    }

    pub fn service_mut(&mut self) -> &mut RpcService {
        &mut self.rpc
    }

    // Asset

    pub fn get_balance(&self, asset_id: &str) -> Result<ServiceFuture, ServiceError> {
        self.call("getbalance", vec![json!(asset_id)])
    }

    // Block

    pub fn get_last_block_hash(&self) -> Result<ServiceFuture, ServiceError> {
        self.call("getbestblockhash", vec![])
    }

    pub fn get_block_by_height(&self, height: u64, verbose: bool) -> Result<ServiceFuture, ServiceError> {
        self.call("getblock", vec![json!(height), verbose_flag(verbose)])
    }

    pub fn get_block_count(&self) -> Result<ServiceFuture, ServiceError> {
        self.call("getblockcount", vec![])
    }

    pub fn get_block_hash_by_height(&self, height: u64) -> Result<ServiceFuture, ServiceError> {
        self.call("getblockhash", vec![json!(height)])
    }

    // Net

    pub fn get_connection_count(&self) -> Result<ServiceFuture, ServiceError> {
        self.call("getconnectioncount", vec![])
    }

    // Tx

    pub fn get_raw_mem_pool(&self) -> Result<ServiceFuture, ServiceError> {
        self.call("getrawmempool", vec![])
    }

    pub fn get_raw_transaction(&self, txid: &str, verbose: bool) -> Result<ServiceFuture, ServiceError> {
        self.call("getrawtransaction", vec![json!(txid), verbose_flag(verbose)])
    }

    pub fn get_tx_out(&self, txid: &str, index: u32) -> Result<ServiceFuture, ServiceError> {
        self.call("gettxout", vec![json!(txid), json!(index)])
    }
}

fn verbose_flag(verbose: bool) -> Value {
    json!(if verbose { 1 } else { 0 })
}

impl RpcCapable for NeoNode {
    fn rpc(&self) -> &RpcService {
        &self.rpc
    }
}

impl CurrentHeight for NeoNode {
    fn current_height(&self) -> Result<ServiceFuture, ServiceError> {
        self.get_block_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Recorder;
    use neorpc_core::HttpMethod;

    #[tokio::test]
    async fn block_count_resolves_result() {
        let rec = Recorder::new();
        rec.respond(LOCAL_NODE_URL, json!({"jsonrpc": "2.0", "id": 1, "result": 1_500_000}));
        let node = NeoNode::local(&rec.context());

        let count = node.get_block_count().unwrap().await.unwrap();
        assert_eq!(count, json!(1_500_000));
        assert_eq!(rec.last().method, HttpMethod::Post);
        assert_eq!(rec.last_body()["method"], "getblockcount");
    }

    async fn expect_call(rec: &Recorder, fut: Result<ServiceFuture, ServiceError>, method: &str, params: Value) {
        fut.unwrap().await.unwrap();
        let body = rec.last_body();
        assert_eq!(body["method"], method);
        assert_eq!(body["params"], params);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn methods_map_to_rpc_calls() {
        let rec = Recorder::new();
        rec.respond("http://seed", json!({"result": true}));
        let node = NeoNode::new(&rec.context(), "http://seed");

        expect_call(&rec, node.get_balance("0xc56f"), "getbalance", json!(["0xc56f"])).await;
        expect_call(&rec, node.get_last_block_hash(), "getbestblockhash", json!([])).await;
        expect_call(&rec, node.get_block_by_height(12, true), "getblock", json!([12, 1])).await;
        expect_call(&rec, node.get_block_hash_by_height(12), "getblockhash", json!([12])).await;
        expect_call(&rec, node.get_connection_count(), "getconnectioncount", json!([])).await;
        expect_call(&rec, node.get_raw_mem_pool(), "getrawmempool", json!([])).await;
        expect_call(&rec, node.get_raw_transaction("ab", false), "getrawtransaction", json!(["ab", 0])).await;
        expect_call(&rec, node.get_tx_out("ab", 3), "gettxout", json!(["ab", 3])).await;
    }

    #[tokio::test]
    async fn rpc_error_rejects() {
        let rec = Recorder::new();
        rec.respond(
            LOCAL_NODE_URL,
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}}),
        );
        let node = NeoNode::local(&rec.context());

        let err = node.get_raw_mem_pool().unwrap().await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(ref e) if e["code"] == -32601));
    }
}
