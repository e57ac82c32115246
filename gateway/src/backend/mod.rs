//! Backend collaborators the dispatcher forwards to.
//!
//! Each backend is a trait so the dispatcher can be exercised against mocks.
//! Production implementations talk HTTP through a shared [`reqwest::Client`]:
//!
//! | Trait | Implementation | Service |
//! |-------|----------------|---------|
//! | [`ExplorerBackend`] | [`BlockscoutExplorer`] | Blockscout `module=account` API |
//! | [`RpcBackend`] | [`JsonRpcClient`] | chain node JSON-RPC |
//! | [`GasPriceOracle`] | [`GasStationOracle`] | ETH Gas Station feed |
//! | [`PriceOracle`] | [`CryptoCompareOracle`] | CryptoCompare price API |
//!
//! Every call resolves to a value or a [`BackendError`]; timeouts are owned
//! by the HTTP client.

mod explorer;
mod gas;
mod http;
mod price;
mod rpc;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use self::explorer::BlockscoutExplorer;
pub use self::gas::GasStationOracle;
pub use self::price::CryptoCompareOracle;
pub use self::rpc::JsonRpcClient;
use crate::chain::{ChainConfig, RpcUrlError};
use crate::config::BackendsConfig;
use crate::error::Error;
use crate::validate::{Address, FiatList, HexPayload};

/// Failure reported by, or while talking to, a backend service.
///
/// The display string is forwarded to the caller verbatim, so it never
/// contains credentials or request URLs.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection failure, timeout, or other transport problem.
    #[error("{service} request failed: {detail}")]
    Transport {
        /// Backend name.
        service: &'static str,
        /// Transport error text.
        detail: String,
    },
    /// Non-2xx HTTP status.
    #[error("{service} responded with HTTP {status}")]
    Status {
        /// Backend name.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },
    /// Response body did not have the expected shape.
    #[error("{service} returned a malformed response: {detail}")]
    Decode {
        /// Backend name.
        service: &'static str,
        /// What was wrong with it.
        detail: String,
    },
    /// The backend answered with an application-level error message.
    #[error("{0}")]
    Upstream(String),
    /// The chain's RPC endpoint could not be resolved.
    #[error(transparent)]
    Endpoint(#[from] RpcUrlError),
}

impl BackendError {
    pub(crate) fn decode(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Decode {
            service,
            detail: detail.into(),
        }
    }
}

/// Block-explorer queries for one account on one chain.
#[async_trait]
pub trait ExplorerBackend: Send + Sync {
    /// Native and token balances held by `address`.
    async fn account_assets(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError>;

    /// Transaction history of `address`.
    async fn account_transactions(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError>;
}

/// JSON-RPC node queries for one chain.
#[async_trait]
pub trait RpcBackend: Send + Sync {
    /// Pending transaction count of `address`.
    async fn nonce(&self, chain: &ChainConfig, address: &Address) -> Result<Value, BackendError>;

    /// Gas estimate for calling `to` with `data`.
    async fn estimate_gas(
        &self,
        chain: &ChainConfig,
        to: &Address,
        data: &HexPayload,
    ) -> Result<Value, BackendError>;

    /// Latest block number.
    async fn block_number(&self, chain: &ChainConfig) -> Result<Value, BackendError>;

    /// Forwards an opaque JSON-RPC request body and returns the node's reply.
    async fn raw(&self, chain: &ChainConfig, body: Value) -> Result<Value, BackendError>;
}

/// Current network gas prices.
#[async_trait]
pub trait GasPriceOracle: Send + Sync {
    /// Slow / average / fast gas price tiers.
    async fn current(&self) -> Result<Value, BackendError>;
}

/// Native-asset fiat exchange rates.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Rates of the native asset in each of `fiat`.
    async fn quote(&self, fiat: &FiatList) -> Result<Value, BackendError>;
}

/// The set of backends injected into the dispatcher.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct Backends {
    /// Explorer client.
    pub explorer: Arc<dyn ExplorerBackend>,
    /// JSON-RPC client.
    pub rpc: Arc<dyn RpcBackend>,
    /// Gas price feed.
    pub gas: Arc<dyn GasPriceOracle>,
    /// Fiat price feed.
    pub prices: Arc<dyn PriceOracle>,
}

impl Backends {
    /// Builds the HTTP-backed implementations from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Server`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &BackendsConfig) -> Result<Self, Error> {
        let client = http::build_client(Duration::from_secs(config.request_timeout_secs))
            .map_err(|e| Error::server_with("failed to build HTTP client", e))?;
        Ok(Self {
            explorer: Arc::new(BlockscoutExplorer::new(client.clone())),
            rpc: Arc::new(JsonRpcClient::new(client.clone(), config.rpc_api_key.clone())),
            gas: Arc::new(GasStationOracle::new(
                client.clone(),
                config.gas_price_url.clone(),
            )),
            prices: Arc::new(CryptoCompareOracle::new(
                client,
                config.price_url.clone(),
                config.price_base_symbol.clone(),
            )),
        })
    }
}

#[cfg(test)]
pub(crate) mod mock;
