//! `gateway chains` command: print the resolved supported-chains table.

use std::path::Path;

use crate::chain::{ChainRegistry, ChainsConfig};
use crate::config::load_config;
use crate::error::Error;

/// Execute the `chains` command.
///
/// # Errors
///
/// Returns an error if an existing config file cannot be loaded or the
/// chain table is inconsistent.
#[allow(clippy::print_stdout)]
pub fn run(config_path: &Path) -> Result<(), Error> {
    let chains = if config_path.exists() {
        load_config(config_path)?.chains
    } else {
        ChainsConfig::default()
    };
    let registry = ChainRegistry::from_config(&chains)?;
    let table = serde_json::to_string_pretty(registry.list())
        .map_err(|e| Error::server_with("failed to render chain table", e))?;
    println!("{table}");
    Ok(())
}
