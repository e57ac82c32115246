//! Read-only `chainId → ChainConfig` registry.

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use super::config::{API_KEY_PLACEHOLDER, ChainConfig, ChainsConfig};
use crate::error::Error;
use crate::validate::{ChainId, MAX_SAFE_INTEGER};

/// A well-formed chain id that no registry entry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Chain {0} is not supported")]
pub struct ChainNotSupported(pub ChainId);

/// Immutable table of supported chains, built once at startup.
///
/// Lookups are by numeric id; [`ChainRegistry::list`] preserves the order in
/// which chains were configured.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainConfig>,
    index: HashMap<u64, usize>,
}

impl ChainRegistry {
    /// Builds a registry from configured chains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chain`] if the list is empty, an id is zero or
    /// duplicated, or a URL does not parse.
    pub fn from_config(chains: &ChainsConfig) -> Result<Self, Error> {
        Self::new(chains.to_vec())
    }

    /// Builds a registry from an ordered list of chains.
    ///
    /// # Errors
    ///
    /// See [`ChainRegistry::from_config`].
    pub fn new(chains: Vec<ChainConfig>) -> Result<Self, Error> {
        if chains.is_empty() {
            return Err(Error::chain("no chains configured"));
        }
        let mut index = HashMap::with_capacity(chains.len());
        for (position, chain) in chains.iter().enumerate() {
            check_chain(chain)?;
            if index.insert(chain.chain_id, position).is_some() {
                return Err(Error::chain(format!(
                    "chain {} is configured more than once",
                    chain.chain_id
                )));
            }
        }
        Ok(Self { chains, index })
    }

    /// Resolves a chain id to its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChainNotSupported`] if the id was not configured.
    pub fn lookup(&self, chain_id: ChainId) -> Result<&ChainConfig, ChainNotSupported> {
        self.index
            .get(&chain_id.get())
            .map(|&position| &self.chains[position])
            .ok_or(ChainNotSupported(chain_id))
    }

    /// All supported chains, in registration order.
    #[must_use]
    pub fn list(&self) -> &[ChainConfig] {
        &self.chains
    }

    /// Number of supported chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Always `false` for a constructed registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn check_chain(chain: &ChainConfig) -> Result<(), Error> {
    let id = chain.chain_id;
    // Ids a request could never name are rejected up front.
    if ChainId::new(id).is_none() {
        return Err(Error::chain(format!(
            "chain_id {id} must be between 1 and {MAX_SAFE_INTEGER}"
        )));
    }
    check_url(id, "explorer_base_url", &chain.explorer_base_url)?;
    // Any key will do: only the shape of the template is checked here.
    let rpc = chain.rpc_url.replace(API_KEY_PLACEHOLDER, "key");
    check_url(id, "rpc_url", &rpc)
}

fn check_url(chain_id: u64, field: &str, raw: &str) -> Result<(), Error> {
    if raw.trim().is_empty() {
        return Err(Error::chain(format!("chain {chain_id}: {field} is empty")));
    }
    let url = Url::parse(raw)
        .map_err(|e| Error::chain(format!("chain {chain_id}: invalid {field} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::chain(format!(
            "chain {chain_id}: {field} has unsupported scheme '{other}'"
        ))),
    }
}
