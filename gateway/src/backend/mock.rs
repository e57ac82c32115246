//! In-memory backend used by dispatcher and route tests.
//!
//! One [`MockBackend`] implements every backend trait, answers with a fixed
//! value (or a fixed failure), counts how often it was called and remembers
//! which trait method ran last.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{BackendError, Backends, ExplorerBackend, GasPriceOracle, PriceOracle, RpcBackend};
use crate::chain::{ChainConfig, ChainRegistry, NativeCurrency};
use crate::validate::{Address, FiatList, HexPayload};

#[derive(Debug, Default)]
struct Seen {
    method: Option<&'static str>,
    chain: Option<u64>,
    address: Option<String>,
    data: Option<String>,
    fiat: Option<String>,
    body: Option<Value>,
}

#[derive(Debug)]
pub(crate) struct MockBackend {
    answer: Result<Value, String>,
    calls: AtomicUsize,
    seen: Mutex<Seen>,
}

impl MockBackend {
    pub(crate) fn answering(value: Value) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(value),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Seen::default()),
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_owned()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Seen::default()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_method(&self) -> Option<&'static str> {
        self.seen.lock().unwrap().method
    }

    pub(crate) fn last_chain(&self) -> Option<u64> {
        self.seen.lock().unwrap().chain
    }

    pub(crate) fn last_address(&self) -> Option<String> {
        self.seen.lock().unwrap().address.clone()
    }

    pub(crate) fn last_data(&self) -> Option<String> {
        self.seen.lock().unwrap().data.clone()
    }

    pub(crate) fn last_fiat(&self) -> Option<String> {
        self.seen.lock().unwrap().fiat.clone()
    }

    pub(crate) fn last_body(&self) -> Option<Value> {
        self.seen.lock().unwrap().body.clone()
    }

    fn reply(
        &self,
        method: &'static str,
        record: impl FnOnce(&mut Seen),
    ) -> Result<Value, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut seen = self.seen.lock().unwrap();
        seen.method = Some(method);
        record(&mut *seen);
        drop(seen);
        self.answer.clone().map_err(BackendError::Upstream)
    }
}

#[async_trait]
impl ExplorerBackend for MockBackend {
    async fn account_assets(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError> {
        self.reply("account_assets", |seen| {
            seen.chain = Some(chain.chain_id);
            seen.address = Some(address.to_string());
        })
    }

    async fn account_transactions(
        &self,
        chain: &ChainConfig,
        address: &Address,
    ) -> Result<Value, BackendError> {
        self.reply("account_transactions", |seen| {
            seen.chain = Some(chain.chain_id);
            seen.address = Some(address.to_string());
        })
    }
}

#[async_trait]
impl RpcBackend for MockBackend {
    async fn nonce(&self, chain: &ChainConfig, address: &Address) -> Result<Value, BackendError> {
        self.reply("nonce", |seen| {
            seen.chain = Some(chain.chain_id);
            seen.address = Some(address.to_string());
        })
    }

    async fn estimate_gas(
        &self,
        chain: &ChainConfig,
        to: &Address,
        data: &HexPayload,
    ) -> Result<Value, BackendError> {
        self.reply("estimate_gas", |seen| {
            seen.chain = Some(chain.chain_id);
            seen.address = Some(to.to_string());
            seen.data = Some(data.as_str().to_owned());
        })
    }

    async fn block_number(&self, chain: &ChainConfig) -> Result<Value, BackendError> {
        self.reply("block_number", |seen| seen.chain = Some(chain.chain_id))
    }

    async fn raw(&self, chain: &ChainConfig, body: Value) -> Result<Value, BackendError> {
        self.reply("raw", |seen| {
            seen.chain = Some(chain.chain_id);
            seen.body = Some(body);
        })
    }
}

#[async_trait]
impl GasPriceOracle for MockBackend {
    async fn current(&self) -> Result<Value, BackendError> {
        self.reply("current", |_| {})
    }
}

#[async_trait]
impl PriceOracle for MockBackend {
    async fn quote(&self, fiat: &FiatList) -> Result<Value, BackendError> {
        self.reply("quote", |seen| seen.fiat = Some(fiat.as_str().to_owned()))
    }
}

/// Wires one mock into every backend slot.
pub(crate) fn backends(mock: &Arc<MockBackend>) -> Backends {
    Backends {
        explorer: Arc::clone(mock) as Arc<dyn ExplorerBackend>,
        rpc: Arc::clone(mock) as Arc<dyn RpcBackend>,
        gas: Arc::clone(mock) as Arc<dyn GasPriceOracle>,
        prices: Arc::clone(mock) as Arc<dyn PriceOracle>,
    }
}

/// Registry with Ethereum mainnet (1) followed by xDai (100).
pub(crate) fn registry() -> Arc<ChainRegistry> {
    let chain = |chain_id: u64, symbol: &str, explorer: &str, rpc: &str| ChainConfig {
        chain_id,
        name: format!("chain {chain_id}"),
        explorer_base_url: explorer.to_owned(),
        rpc_url: rpc.to_owned(),
        native_currency: NativeCurrency {
            symbol: symbol.to_owned(),
            name: symbol.to_owned(),
            decimals: 18,
        },
    };
    Arc::new(
        ChainRegistry::new(vec![
            chain(
                1,
                "ETH",
                "https://blockscout.com/eth/mainnet",
                "https://mainnet.infura.io/v3/{api_key}",
            ),
            chain(
                100,
                "xDAI",
                "https://blockscout.com/poa/xdai",
                "https://dai.poa.network",
            ),
        ])
        .unwrap(),
    )
}
