//! Configuration loading and default template generation.
//!
//! This module provides:
//!
//! - [`Config`]: server settings, backend endpoints, and the chain table.
//! - [`load_config`]: reads a TOML file and resolves `$VAR` references.
//! - [`generate_default_config`]: produces a commented TOML template.
//!
//! # Configuration File Format
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5000
//! error_status = "typed"
//!
//! [backends]
//! rpc_api_key = "$INFURA_API_KEY"
//!
//! [[chains]]
//! chain_id = 1
//! name = "Ethereum Mainnet"
//! explorer_base_url = "https://blockscout.com/eth/mainnet"
//! rpc_url = "https://mainnet.infura.io/v3/{api_key}"
//! native_currency = { symbol = "ETH", name = "Ether", decimals = 18 }
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use serde::Deserialize;

use crate::chain::ChainsConfig;
use crate::envelope::StatusPolicy;
use crate::error::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GAS_PRICE_URL: &str = "https://ethgasstation.info/json/ethgasAPI.json";
const DEFAULT_PRICE_URL: &str = "https://min-api.cryptocompare.com/data/price";

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bind address (`HOST` env, then `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Bind port (`PORT` env, then 5000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Failure status code mapping.
    #[serde(default)]
    pub error_status: StatusPolicy,
    /// Backend service settings.
    #[serde(default)]
    pub backends: BackendsConfig,
    /// Supported chains, in listing order. Defaults to the built-in table.
    #[serde(default)]
    pub chains: ChainsConfig,
}

/// Backend service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Per-request timeout applied to every backend call.
    pub request_timeout_secs: u64,
    /// Substituted for `{api_key}` in chain RPC URLs.
    pub rpc_api_key: Option<String>,
    /// ETH Gas Station compatible feed.
    pub gas_price_url: String,
    /// CryptoCompare compatible `data/price` endpoint.
    pub price_url: String,
    /// Asset whose fiat price is quoted.
    pub price_base_symbol: String,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            rpc_api_key: None,
            gas_price_url: DEFAULT_GAS_PRICE_URL.to_owned(),
            price_url: DEFAULT_PRICE_URL.to_owned(),
            price_base_symbol: "ETH".to_owned(),
        }
    }
}

fn default_host() -> IpAddr {
    std::env::var("HOST")
        .ok()
        .and_then(|host| host.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Resolves an environment-variable reference (`$VAR` or `${VAR}`), returning
/// the literal string unchanged if it matches neither form.
fn resolve_env(value: &str) -> Result<String, Error> {
    let name = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .or_else(|| {
            value
                .strip_prefix('$')
                .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'))
        });
    match name {
        Some(name) => std::env::var(name).map_err(|_| {
            Error::config(format!(
                "env var '{name}' not found (referenced as '{value}')"
            ))
        }),
        None => Ok(value.to_owned()),
    }
}

impl Config {
    /// Parses configuration from TOML text and resolves env references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on TOML errors or unset referenced variables.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| Error::config_with("invalid TOML", e))?;
        config.backends.rpc_api_key = config
            .backends
            .rpc_api_key
            .as_deref()
            .map(resolve_env)
            .transpose()?
            .filter(|key| !key.is_empty());
        for chain in &mut config.chains.0 {
            chain.rpc_url = resolve_env(&chain.rpc_url)?;
        }
        Ok(config)
    }
}

/// Load configuration from a TOML file at the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be resolved, read, or parsed.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config_with(format!("failed to resolve config path '{}'", path.display()), e)
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config_with(
            format!("failed to read config file '{}'", config_path.display()),
            e,
        )
    })?;
    Config::from_toml(&content)
        .map_err(|e| Error::config_with(format!("'{}'", config_path.display()), e))
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    let mut config = String::from(
        r#"# Multi-chain gateway configuration

# Server bind address and port.
# Can also be set via HOST / PORT environment variables.
host = "0.0.0.0"
port = 5000

# Log filter used when RUST_LOG is not set.
log_level = "info"

# Failure status codes: "typed" (400 / 404 / 502 / 500) or
# "legacy" (every failure is a 500 "Internal Server Error").
error_status = "typed"

# ── Backends ─────────────────────────────────────────────────────────
# Values support environment variable references: "$VAR" or "${VAR}"

[backends]
request_timeout_secs = 10
rpc_api_key = "$INFURA_API_KEY"
gas_price_url = "https://ethgasstation.info/json/ethgasAPI.json"
price_url = "https://min-api.cryptocompare.com/data/price"
price_base_symbol = "ETH"
"#,
    );

    config.push_str(
        r#"
# ── Chains ───────────────────────────────────────────────────────────
# Listed in this order by /supported-chains. "{api_key}" in rpc_url is
# replaced with backends.rpc_api_key. Omit every [[chains]] entry to
# serve the built-in table.
"#,
    );
    for chain in ChainsConfig::default().iter() {
        config.push_str(&format!(
            r#"
[[chains]]
chain_id = {}
name = "{}"
explorer_base_url = "{}"
rpc_url = "{}"
native_currency = {{ symbol = "{}", name = "{}", decimals = {} }}
"#,
            chain.chain_id,
            chain.name,
            chain.explorer_base_url,
            chain.rpc_url,
            chain.native_currency.symbol,
            chain.native_currency.name,
            chain.native_currency.decimals,
        ));
    }

    config
}
