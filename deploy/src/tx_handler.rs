use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::sleep;

use crate::address::{Address, SYSTEM_ADDRESS};
use crate::transaction;
use crate::wallet::KeyWallet;

// goloop codes for a transaction that is not finalized yet
const RPC_PENDING: i64 = -31002;
const RPC_EXECUTING: i64 = -31003;
const RPC_NOT_FOUND: i64 = -31004;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Server { code: i64, message: String },
    #[error("rpc response carried neither result nor error")]
    MissingResult,
}

impl RpcError {
    fn is_result_pending(&self) -> bool {
        matches!(
            self,
            RpcError::Server {
                code: RPC_PENDING | RPC_EXECUTING | RPC_NOT_FOUND,
                ..
            }
        )
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Transaction submission capability bound to one endpoint.
#[async_trait]
pub trait TxHandler {
    /// Deploy a new contract. Returns the transaction hash.
    async fn install(
        &self,
        owner: &KeyWallet,
        content: &[u8],
        content_type: &str,
        params: &Value,
    ) -> Result<String>;

    /// Update the contract at `to`. Returns the transaction hash.
    async fn update(
        &self,
        owner: &KeyWallet,
        to: &Address,
        content: &[u8],
        content_type: &str,
        params: &Value,
    ) -> Result<String>;

    /// Block until the transaction result is available and successful.
    async fn ensure_tx_result(&self, tx_hash: &str, wait_notice: bool) -> Result<Value>;
}

pub struct JsonRpcTxHandler {
    client: reqwest::Client,
    url: String,
    nid: u64,
    request_id: AtomicU64,
}

impl JsonRpcTxHandler {
    pub fn new(url: &str, nid: u64) -> Self {
        JsonRpcTxHandler {
            client: reqwest::Client::new(),
            url: url.to_string(),
            nid,
            request_id: AtomicU64::new(1000),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        // error responses come back with a non-2xx status and a JSON-RPC error
        // body, so decode before checking the status
        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::Server {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or(RpcError::MissingResult)
    }

    async fn send_deploy(
        &self,
        owner: &KeyWallet,
        to: &str,
        content: &[u8],
        content_type: &str,
        params: &Value,
    ) -> Result<String> {
        let mut tx =
            transaction::deploy_transaction(owner.address(), to, self.nid, content, content_type, params);
        let signature = owner.sign(transaction::hash(&tx))?;
        tx["signature"] = json!(signature);

        let result = self.call("icx_sendTransaction", tx).await?;
        match result {
            Value::String(tx_hash) => Ok(tx_hash),
            other => bail!("unexpected icx_sendTransaction result: {other}"),
        }
    }
}

#[async_trait]
impl TxHandler for JsonRpcTxHandler {
    async fn install(
        &self,
        owner: &KeyWallet,
        content: &[u8],
        content_type: &str,
        params: &Value,
    ) -> Result<String> {
        self.send_deploy(owner, SYSTEM_ADDRESS, content, content_type, params)
            .await
    }

    async fn update(
        &self,
        owner: &KeyWallet,
        to: &Address,
        content: &[u8],
        content_type: &str,
        params: &Value,
    ) -> Result<String> {
        self.send_deploy(owner, to.as_str(), content, content_type, params)
            .await
    }

    async fn ensure_tx_result(&self, tx_hash: &str, wait_notice: bool) -> Result<Value> {
        loop {
            sleep(Duration::from_secs(1)).await;
            match self
                .call("icx_getTransactionResult", json!({ "txHash": tx_hash }))
                .await
            {
                Ok(result) => return ensure_success(tx_hash, result),
                Err(error) if error.is_result_pending() => {
                    if wait_notice {
                        log::info!("waiting for tx result: {tx_hash}");
                    }
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

fn ensure_success(tx_hash: &str, result: Value) -> Result<Value> {
    if result["status"] != "0x1" {
        bail!(
            "transaction {tx_hash} failed: {}",
            result["failure"]["message"].as_str().unwrap_or("unknown")
        );
    }
    Ok(result)
}
