//! Blockscout-compatible explorer client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::send_json;
use super::{BackendError, ExplorerBackend};
use crate::chain::ChainConfig;
use crate::validate::Address;

const SERVICE: &str = "explorer";

/// Envelope every `module=account` endpoint answers with.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: Value,
}

impl ExplorerResponse {
    /// Blockscout reports "nothing found" as `status = "0"` with an empty
    /// array, which is a valid (empty) answer rather than a failure.
    ///
    /// Etherscan-style explorers send a bare `NOTOK` message and put the
    /// detail in `result`; that detail is forwarded instead.
    fn into_result(self) -> Result<Value, BackendError> {
        if self.status == "1" || self.result.is_array() {
            return Ok(self.result);
        }
        let generic = self.message.is_empty() || self.message.eq_ignore_ascii_case("NOTOK");
        let message = match self.result {
            Value::String(detail) if generic && !detail.trim().is_empty() => detail,
            _ if generic => "explorer returned no result".to_owned(),
            _ => self.message,
        };
        Err(BackendError::Upstream(message))
    }
}

/// Token entry as returned by `action=tokenlist`.
///
/// Tokens without metadata come back with `null` fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEntry {
    #[serde(default)]
    balance: Option<String>,
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    decimals: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

/// One balance line in the assets listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Asset {
    symbol: String,
    name: String,
    decimals: String,
    contract_address: String,
    balance: String,
}

fn native_asset(chain: &ChainConfig, balance: &Value) -> Asset {
    let balance = match balance {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => "0".to_owned(),
    };
    Asset {
        symbol: chain.native_currency.symbol.clone(),
        name: chain.native_currency.name.clone(),
        decimals: chain.native_currency.decimals.to_string(),
        contract_address: String::new(),
        balance,
    }
}

fn token_assets(tokens: Value) -> Result<Vec<Asset>, BackendError> {
    let tokens: Vec<TokenEntry> = serde_json::from_value(tokens)
        .map_err(|e| BackendError::decode(SERVICE, format!("token list: {e}")))?;
    Ok(tokens
        .into_iter()
        .map(|token| Asset {
            symbol: token.symbol.unwrap_or_default(),
            name: token.name.unwrap_or_default(),
            decimals: token.decimals.unwrap_or_default(),
            contract_address: token.contract_address.unwrap_or_default(),
            balance: token.balance.unwrap_or_default(),
        })
        .collect())
}

/// Explorer client speaking the Blockscout (Etherscan-style) account API.
#[derive(Debug, Clone)]
pub struct BlockscoutExplorer {
    client: Client,
}

impl BlockscoutExplorer {
    /// Creates a client on top of a shared HTTP client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    async fn account_action(
        &self,
        chain: &ChainConfig,
        action: &str,
        address: &Address,
    ) -> Result<Value, BackendError> {
        let url = format!("{}/api", chain.explorer_base_url.trim_end_matches('/'));
        tracing::debug!(chain_id = chain.chain_id, action, "explorer request");
        let request = self.client.get(url).query(&[
            ("module", "account"),
            ("action", action),
            ("address", address.as_str()),
        ]);
        send_json::<ExplorerResponse>(SERVICE, request)
            .await?
            .into_result()
    }
}

#[async_trait]
impl ExplorerBackend for BlockscoutExplorer {
    async fn account_assets(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError> {
        let balance = self.account_action(chain, "balance", address).await?;
        let tokens = self.account_action(chain, "tokenlist", address).await?;

        let mut assets = vec![native_asset(chain, &balance)];
        assets.extend(token_assets(tokens)?);
        serde_json::to_value(assets).map_err(|e| BackendError::decode(SERVICE, e.to_string()))
    }

    async fn account_transactions(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError> {
        self.account_action(chain, "txlist", address).await
    }
}
