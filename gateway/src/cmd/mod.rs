//! CLI definitions and command implementations for the gateway.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod chains;
pub mod init;
pub mod serve;

/// Multi-chain gateway: account, gas, price and raw JSON-RPC queries over HTTP.
#[derive(Debug, Parser)]
#[command(name = "gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Start the gateway HTTP server.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,
    },

    /// Print the supported-chains table as JSON and exit.
    Chains {
        /// Path to the TOML configuration file. The built-in table is used
        /// when the file does not exist.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,
    },
}
