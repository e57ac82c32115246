//! Startup error types for the gateway.
//!
//! Request-level failures live in [`crate::dispatch::GatewayError`]; the
//! variants here only ever surface before the server accepts traffic.

use thiserror::Error;

/// Top-level error type for the gateway process.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be resolved, read, or parsed.
    #[error("config: {0}")]
    Config(String),

    /// Chain table is inconsistent (duplicate id, bad URL, ...).
    #[error("chain: {0}")]
    Chain(String),

    /// Server bind, backend client construction, or runtime error.
    #[error("server: {0}")]
    Server(String),
}

impl Error {
    /// Configuration error from a plain message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Configuration error wrapping an underlying cause.
    pub fn config_with(context: impl AsRef<str>, source: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {source}", context.as_ref()))
    }

    /// Chain table error from a plain message.
    pub fn chain(message: impl Into<String>) -> Self {
        Self::Chain(message.into())
    }

    /// Server error wrapping an underlying cause.
    pub fn server_with(context: impl AsRef<str>, source: impl std::fmt::Display) -> Self {
        Self::Server(format!("{}: {source}", context.as_ref()))
    }
}
