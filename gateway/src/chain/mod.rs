//! Chain configuration types and the read-only chain registry.
//!
//! - [`config`]: [`ChainConfig`] / [`ChainsConfig`] as they appear in TOML
//!   and on the `/supported-chains` wire.
//! - [`builtin`]: the chain table used when the config file declares none.
//! - [`registry`]: [`ChainRegistry`], the validated `chainId → ChainConfig` map.

mod builtin;
mod config;
mod registry;

pub use self::config::*;
pub use self::registry::*;
