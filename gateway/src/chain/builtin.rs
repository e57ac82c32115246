//! Chains served when the configuration file declares none.

use super::config::{ChainConfig, NativeCurrency};

struct BuiltinChain {
    chain_id: u64,
    name: &'static str,
    explorer: &'static str,
    rpc: &'static str,
    symbol: &'static str,
    currency: &'static str,
}

const BUILTIN: &[BuiltinChain] = &[
    BuiltinChain {
        chain_id: 1,
        name: "Ethereum Mainnet",
        explorer: "https://blockscout.com/eth/mainnet",
        rpc: "https://mainnet.infura.io/v3/{api_key}",
        symbol: "ETH",
        currency: "Ether",
    },
    BuiltinChain {
        chain_id: 3,
        name: "Ethereum Ropsten",
        explorer: "https://blockscout.com/eth/ropsten",
        rpc: "https://ropsten.infura.io/v3/{api_key}",
        symbol: "ETH",
        currency: "Ether",
    },
    BuiltinChain {
        chain_id: 4,
        name: "Ethereum Rinkeby",
        explorer: "https://blockscout.com/eth/rinkeby",
        rpc: "https://rinkeby.infura.io/v3/{api_key}",
        symbol: "ETH",
        currency: "Ether",
    },
    BuiltinChain {
        chain_id: 5,
        name: "Ethereum Görli",
        explorer: "https://blockscout.com/eth/goerli",
        rpc: "https://goerli.infura.io/v3/{api_key}",
        symbol: "ETH",
        currency: "Ether",
    },
    BuiltinChain {
        chain_id: 42,
        name: "Ethereum Kovan",
        explorer: "https://blockscout.com/eth/kovan",
        rpc: "https://kovan.infura.io/v3/{api_key}",
        symbol: "ETH",
        currency: "Ether",
    },
    BuiltinChain {
        chain_id: 61,
        name: "Ethereum Classic Mainnet",
        explorer: "https://blockscout.com/etc/mainnet",
        rpc: "https://ethereumclassic.network",
        symbol: "ETC",
        currency: "Ether Classic",
    },
    BuiltinChain {
        chain_id: 77,
        name: "POA Network Sokol",
        explorer: "https://blockscout.com/poa/sokol",
        rpc: "https://sokol.poa.network",
        symbol: "SPOA",
        currency: "Sokol POA",
    },
    BuiltinChain {
        chain_id: 99,
        name: "POA Network Core",
        explorer: "https://blockscout.com/poa/core",
        rpc: "https://core.poa.network",
        symbol: "POA",
        currency: "POA",
    },
    BuiltinChain {
        chain_id: 100,
        name: "xDAI Chain",
        explorer: "https://blockscout.com/poa/xdai",
        rpc: "https://dai.poa.network",
        symbol: "xDAI",
        currency: "xDAI",
    },
];

/// Returns the built-in chain table in registration order.
pub(super) fn chains() -> Vec<ChainConfig> {
    BUILTIN
        .iter()
        .map(|chain| ChainConfig {
            chain_id: chain.chain_id,
            name: chain.name.to_owned(),
            explorer_base_url: chain.explorer.to_owned(),
            rpc_url: chain.rpc.to_owned(),
            native_currency: NativeCurrency {
                symbol: chain.symbol.to_owned(),
                name: chain.currency.to_owned(),
                decimals: 18,
            },
        })
        .collect()
}
