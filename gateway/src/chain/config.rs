//! Chain configuration types.
//!
//! Field names are `snake_case` in TOML and `camelCase` on the wire, so the
//! same value serves both the config file and the `/supported-chains` listing.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::builtin;

/// Placeholder substituted with the configured RPC API key.
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Native asset of a chain (the unit fees are paid in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct NativeCurrency {
    /// Ticker symbol, e.g. `ETH`.
    pub symbol: String,
    /// Display name, e.g. `Ether`.
    #[serde(default)]
    pub name: String,
    /// Decimal precision of the base unit.
    pub decimals: u8,
}

/// Backend configuration for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ChainConfig {
    /// Numeric EIP-155 chain identifier.
    pub chain_id: u64,
    /// Human-readable network name.
    #[serde(default)]
    pub name: String,
    /// Base URL of the Blockscout-compatible explorer.
    pub explorer_base_url: String,
    /// JSON-RPC URL, possibly containing [`API_KEY_PLACEHOLDER`].
    pub rpc_url: String,
    /// Native asset metadata.
    pub native_currency: NativeCurrency,
}

/// Failure to turn an RPC URL template into a concrete endpoint.
#[derive(Debug, Error)]
pub enum RpcUrlError {
    /// The template needs an API key and none is configured.
    #[error("RPC API key is not configured for chain {0}")]
    MissingApiKey(u64),
    /// The substituted template is not a valid URL.
    #[error("invalid RPC URL for chain {chain_id}: {source}")]
    Invalid {
        /// Chain whose template failed.
        chain_id: u64,
        /// Parser error.
        source: url::ParseError,
    },
}

impl ChainConfig {
    /// Whether the RPC URL template references an API key.
    #[must_use]
    pub fn rpc_needs_api_key(&self) -> bool {
        self.rpc_url.contains(API_KEY_PLACEHOLDER)
    }

    /// Resolves the RPC URL template into a concrete endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RpcUrlError::MissingApiKey`] if the template references a key
    /// that is not configured, or [`RpcUrlError::Invalid`] if the result does
    /// not parse.
    pub fn rpc_endpoint(&self, api_key: Option<&str>) -> Result<Url, RpcUrlError> {
        let raw = if self.rpc_needs_api_key() {
            let key = api_key.ok_or(RpcUrlError::MissingApiKey(self.chain_id))?;
            self.rpc_url.replace(API_KEY_PLACEHOLDER, key)
        } else {
            self.rpc_url.clone()
        };
        Url::parse(&raw).map_err(|source| RpcUrlError::Invalid {
            chain_id: self.chain_id,
            source,
        })
    }
}

/// Ordered collection of [`ChainConfig`] entries.
///
/// Serialised as a TOML array of tables; order is registration order.
/// Defaults to the built-in chain table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainsConfig(pub Vec<ChainConfig>);

impl Default for ChainsConfig {
    fn default() -> Self {
        Self(builtin::chains())
    }
}

impl Deref for ChainsConfig {
    type Target = Vec<ChainConfig>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
