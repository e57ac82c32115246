//! Multi-chain blockchain data gateway.
//!
//! Serves account, gas, price and raw JSON-RPC queries for a configurable set
//! of EVM chains behind one HTTP API with a uniform JSON envelope.
//!
//! ```sh
//! gateway init            # Generate default config.toml
//! gateway serve           # Start the server
//! gateway chains          # Print the supported-chains table
//! ```

mod backend;
mod chain;
mod cmd;
mod config;
mod dispatch;
mod envelope;
mod error;
mod routes;
mod server;
mod shutdown;
mod telemetry;
mod validate;

use clap::Parser;
use cmd::{Cli, Commands};

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::Serve { config } => cmd::serve::run(&config).await,
        Commands::Chains { config } => cmd::chains::run(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
