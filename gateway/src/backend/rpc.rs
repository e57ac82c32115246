//! JSON-RPC 2.0 client for chain nodes.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::http::send_json;
use super::{BackendError, RpcBackend};
use crate::chain::ChainConfig;
use crate::validate::{Address, HexPayload};

const SERVICE: &str = "rpc";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, BackendError> {
        if let Some(error) = self.error {
            return Err(BackendError::Upstream(error.message));
        }
        self.result
            .ok_or_else(|| BackendError::decode(SERVICE, "response has neither result nor error"))
    }
}

/// Decodes a `0x`-prefixed hex quantity.
fn quantity(value: &Value) -> Result<u64, BackendError> {
    let raw = value
        .as_str()
        .ok_or_else(|| BackendError::decode(SERVICE, format!("expected hex quantity, got {value}")))?;
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| BackendError::decode(SERVICE, format!("quantity '{raw}' lacks 0x prefix")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| BackendError::decode(SERVICE, format!("quantity '{raw}': {e}")))
}

/// JSON-RPC client resolving each chain's endpoint from its URL template.
#[derive(Debug)]
pub struct JsonRpcClient {
    client: Client,
    api_key: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates a client; `api_key` fills `{api_key}` in RPC URL templates.
    #[must_use]
    pub const fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(
        &self,
        chain: &ChainConfig,
        method: &str,
        params: Value,
    ) -> Result<Value, BackendError> {
        let endpoint = chain.rpc_endpoint(self.api_key.as_deref())?;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(chain_id = chain.chain_id, method, "rpc request");
        send_json::<RpcResponse>(SERVICE, self.client.post(endpoint).json(&request))
            .await?
            .into_result()
    }
}

#[async_trait]
impl RpcBackend for JsonRpcClient {
    async fn nonce(&self, chain: &ChainConfig, address: &Address) -> Result<Value, BackendError> {
        let result = self
            .call(
                chain,
                "eth_getTransactionCount",
                json!([address.as_str(), "pending"]),
            )
            .await?;
        Ok(json!(quantity(&result)?))
    }

    async fn estimate_gas(
        &self,
        chain: &ChainConfig,
        to: &Address,
        data: &HexPayload,
    ) -> Result<Value, BackendError> {
        let result = self
            .call(
                chain,
                "eth_estimateGas",
                json!([{ "to": to.as_str(), "data": data.as_str() }]),
            )
            .await?;
        Ok(json!(quantity(&result)?))
    }

    async fn block_number(&self, chain: &ChainConfig) -> Result<Value, BackendError> {
        let result = self.call(chain, "eth_blockNumber", json!([])).await?;
        Ok(json!(quantity(&result)?))
    }

    async fn raw(&self, chain: &ChainConfig, body: Value) -> Result<Value, BackendError> {
        let endpoint = chain.rpc_endpoint(self.api_key.as_deref())?;
        tracing::debug!(chain_id = chain.chain_id, "raw rpc request");
        send_json::<Value>(SERVICE, self.client.post(endpoint).json(&body)).await
    }
}
