//! Request dispatch: validate, resolve the chain, call exactly one backend.
//!
//! [`Dispatcher`] owns the immutable [`ChainRegistry`] and the injected
//! [`Backends`]. Every operation follows the same sequence:
//!
//! 1. run all validators for the operation, collecting every failed field;
//! 2. stop with [`GatewayError::Validation`] if any failed;
//! 3. resolve the chain, stopping with [`GatewayError::ChainNotSupported`];
//! 4. make a single backend call and return its result unchanged.
//!
//! No step retries, and no backend is touched once a step has failed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use crate::backend::{BackendError, Backends};
use crate::chain::{ChainConfig, ChainNotSupported, ChainRegistry};
use crate::validate::{
    Address, ChainId, Invalid, ValidationErrors, parse_chain_id, parse_fiat_list,
    sanitize_address, sanitize_hex_payload,
};

/// Request-level failure, mapped to the error envelope by [`crate::envelope`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// One or more inputs were missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// Well-formed chain id absent from the registry.
    #[error(transparent)]
    ChainNotSupported(#[from] ChainNotSupported),
    /// The backend call failed; its message is forwarded verbatim.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Fault inside the gateway itself. The detail is logged, never returned.
    #[error("An internal error occurred")]
    Internal(String),
}

type Outcome = Result<Value, GatewayError>;

/// Logical gateway operations, used to label logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Native and token balances of an account.
    AccountAssets,
    /// Transaction history of an account.
    AccountTransactions,
    /// Pending nonce of an account.
    AccountNonce,
    /// Gas estimate for a contract call.
    GasLimit,
    /// Current gas price tiers.
    GasPrices,
    /// Native asset fiat prices.
    EthPrices,
    /// Latest block number.
    BlockNumber,
    /// Opaque JSON-RPC passthrough.
    CustomRpc,
    /// Supported chains listing.
    SupportedChains,
}

impl Operation {
    /// Stable kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountAssets => "get-account-assets",
            Self::AccountTransactions => "get-account-transactions",
            Self::AccountNonce => "get-account-nonce",
            Self::GasLimit => "get-gas-limit",
            Self::GasPrices => "get-gas-prices",
            Self::EthPrices => "get-eth-prices",
            Self::BlockNumber => "get-block-number",
            Self::CustomRpc => "forward-custom-rpc",
            Self::SupportedChains => "list-supported-chains",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes validated requests to backends.
#[allow(missing_debug_implementations)]
pub struct Dispatcher {
    registry: Arc<ChainRegistry>,
    backends: Backends,
}

impl Dispatcher {
    /// Creates a dispatcher over an immutable registry and a backend set.
    #[must_use]
    pub const fn new(registry: Arc<ChainRegistry>, backends: Backends) -> Self {
        Self { registry, backends }
    }

    /// `get-account-assets`: explorer balances for `address` on `chain_id`.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn account_assets(&self, address: Option<&str>, chain_id: Option<&str>) -> Outcome {
        Self::run(Operation::AccountAssets, async {
            let (address, chain) = self.account_inputs(address, chain_id)?;
            Outcome::Ok(self.backends.explorer.account_assets(chain, &address).await?)
        })
        .await
    }

    /// `get-account-transactions`: explorer history for `address` on `chain_id`.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn account_transactions(
        &self,
        address: Option<&str>,
        chain_id: Option<&str>,
    ) -> Outcome {
        Self::run(Operation::AccountTransactions, async {
            let (address, chain) = self.account_inputs(address, chain_id)?;
            Outcome::Ok(
                self.backends
                    .explorer
                    .account_transactions(chain, &address)
                    .await?,
            )
        })
        .await
    }

    /// `get-account-nonce`: pending transaction count via RPC.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn account_nonce(&self, address: Option<&str>, chain_id: Option<&str>) -> Outcome {
        Self::run(Operation::AccountNonce, async {
            let (address, chain) = self.account_inputs(address, chain_id)?;
            Outcome::Ok(self.backends.rpc.nonce(chain, &address).await?)
        })
        .await
    }

    /// `get-gas-limit`: gas estimate for calling `contract_address` with `data`.
    ///
    /// `data` defaults to empty call data.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn gas_limit(
        &self,
        contract_address: Option<&str>,
        data: Option<&str>,
        chain_id: Option<&str>,
    ) -> Outcome {
        Self::run(Operation::GasLimit, async {
            let mut errors = ValidationErrors::default();
            let contract = errors.check("contractAddress", sanitize_address(contract_address));
            let data = errors.check("data", sanitize_hex_payload(data));
            let chain_id = errors.check("chainId", parse_chain_id(chain_id));
            let (Some(contract), Some(data), Some(chain_id)) = (contract, data, chain_id) else {
                return Err(errors.into());
            };
            let chain = self.resolve(chain_id)?;
            Outcome::Ok(self.backends.rpc.estimate_gas(chain, &contract, &data).await?)
        })
        .await
    }

    /// `get-gas-prices`: current gas price tiers.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn gas_prices(&self) -> Outcome {
        Self::run(Operation::GasPrices, async {
            Outcome::Ok(self.backends.gas.current().await?)
        })
        .await
    }

    /// `get-eth-prices`: native asset rates for `fiat` (default `USD,EUR,GBP`).
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn eth_prices(&self, fiat: Option<&str>) -> Outcome {
        Self::run(Operation::EthPrices, async {
            let fiat = parse_fiat_list(fiat).map_err(|_| ValidationErrors::single("fiat"))?;
            Outcome::Ok(self.backends.prices.quote(&fiat).await?)
        })
        .await
    }

    /// `get-block-number`: latest block on `chain_id`.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn block_number(&self, chain_id: Option<&str>) -> Outcome {
        Self::run(Operation::BlockNumber, async {
            let chain_id = parse_chain_id(chain_id).map_err(|_| ValidationErrors::single("chainId"))?;
            let chain = self.resolve(chain_id)?;
            Outcome::Ok(self.backends.rpc.block_number(chain).await?)
        })
        .await
    }

    /// `forward-custom-rpc`: passes `body` to the chain's node untouched.
    ///
    /// `body` is `None` when the request body was not valid JSON.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`].
    pub async fn custom_rpc(&self, chain_id: Option<&str>, body: Option<Value>) -> Outcome {
        Self::run(Operation::CustomRpc, async {
            let mut errors = ValidationErrors::default();
            let chain_id = errors.check("chainId", parse_chain_id(chain_id));
            let body = errors.check("body", body.ok_or(Invalid));
            let (Some(chain_id), Some(body)) = (chain_id, body) else {
                return Err(errors.into());
            };
            let chain = self.resolve(chain_id)?;
            Outcome::Ok(self.backends.rpc.raw(chain, body).await?)
        })
        .await
    }

    /// `list-supported-chains`: the registry in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the table cannot be serialised.
    pub async fn supported_chains(&self) -> Outcome {
        Self::run(Operation::SupportedChains, async {
            serde_json::to_value(self.registry.list())
                .map_err(|e| GatewayError::Internal(format!("serialising chain table: {e}")))
        })
        .await
    }

    fn account_inputs(
        &self,
        address: Option<&str>,
        chain_id: Option<&str>,
    ) -> Result<(Address, &ChainConfig), GatewayError> {
        let mut errors = ValidationErrors::default();
        let address = errors.check("address", sanitize_address(address));
        let chain_id = errors.check("chainId", parse_chain_id(chain_id));
        let (Some(address), Some(chain_id)) = (address, chain_id) else {
            return Err(errors.into());
        };
        Ok((address, self.resolve(chain_id)?))
    }

    fn resolve(&self, chain_id: ChainId) -> Result<&ChainConfig, GatewayError> {
        tracing::Span::current().record("chain_id", chain_id.get());
        Ok(self.registry.lookup(chain_id)?)
    }

    /// Runs one operation inside its own span and logs failures by kind.
    async fn run(operation: Operation, work: impl Future<Output = Outcome>) -> Outcome {
        let span = tracing::info_span!(
            "dispatch",
            operation = operation.as_str(),
            chain_id = tracing::field::Empty,
        );
        async move {
            let outcome = work.await;
            match &outcome {
                Ok(_) => tracing::debug!("completed"),
                Err(GatewayError::Validation(error)) => {
                    tracing::debug!(%error, "rejected invalid input");
                }
                Err(GatewayError::ChainNotSupported(error)) => {
                    tracing::info!(%error, "rejected unsupported chain");
                }
                Err(GatewayError::Backend(error)) => {
                    tracing::warn!(%error, "backend call failed");
                }
                Err(GatewayError::Internal(detail)) => {
                    tracing::error!(detail = %detail, "internal error");
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::mock::{MockBackend, backends, registry};

    const ADDRESS: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    fn dispatcher(mock: &Arc<MockBackend>) -> Dispatcher {
        Dispatcher::new(registry(), backends(mock))
    }

    #[tokio::test]
    async fn assets_wrap_backend_result_unchanged() {
        let mock = MockBackend::answering(json!([{ "symbol": "ETH", "balance": "1000" }]));
        let result = dispatcher(&mock)
            .account_assets(Some(ADDRESS), Some("1"))
            .await
            .unwrap();
        assert_eq!(result, json!([{ "symbol": "ETH", "balance": "1000" }]));
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_address().as_deref(), Some(ADDRESS));
        assert_eq!(mock.last_chain(), Some(1));
    }

    #[tokio::test]
    async fn invalid_address_never_reaches_backend() {
        let mock = MockBackend::answering(json!([]));
        let err = dispatcher(&mock)
            .account_assets(Some("not-hex"), Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert_eq!(err.to_string(), "Missing or invalid address parameter");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn every_invalid_field_is_reported() {
        let mock = MockBackend::answering(json!(21_000));
        let err = dispatcher(&mock)
            .gas_limit(Some("0x12"), Some("0xnothex"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing or invalid contractAddress parameter; \
             Missing or invalid data parameter; \
             Missing or invalid chainId parameter"
        );
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_chain_is_distinct_from_malformed_chain() {
        let mock = MockBackend::answering(json!(1));
        let dispatcher = dispatcher(&mock);

        let unknown = dispatcher.block_number(Some("999999")).await.unwrap_err();
        assert!(matches!(unknown, GatewayError::ChainNotSupported(_)));
        assert_eq!(unknown.to_string(), "Chain 999999 is not supported");

        let malformed = dispatcher.block_number(Some("abc")).await.unwrap_err();
        assert!(matches!(malformed, GatewayError::Validation(_)));
        assert_eq!(malformed.to_string(), "Missing or invalid chainId parameter");

        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn gas_limit_defaults_call_data() {
        let mock = MockBackend::answering(json!(21_000));
        let result = dispatcher(&mock)
            .gas_limit(Some(ADDRESS), None, Some("100"))
            .await
            .unwrap();
        assert_eq!(result, json!(21_000));
        assert_eq!(mock.last_data().as_deref(), Some("0x"));
        assert_eq!(mock.last_chain(), Some(100));
    }

    #[tokio::test]
    async fn eth_prices_default_fiat_list() {
        let mock = MockBackend::answering(json!({ "USD": 1, "EUR": 1, "GBP": 1 }));
        let dispatcher = dispatcher(&mock);
        dispatcher.eth_prices(None).await.unwrap();
        assert_eq!(mock.last_fiat().as_deref(), Some("USD,EUR,GBP"));

        dispatcher.eth_prices(Some("jpy")).await.unwrap();
        assert_eq!(mock.last_fiat().as_deref(), Some("JPY"));

        let err = dispatcher.eth_prices(Some("US D")).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid fiat parameter");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn backend_failure_is_forwarded_and_not_retried() {
        let mock = MockBackend::failing("node unavailable");
        let dispatcher = dispatcher(&mock);
        let err = dispatcher
            .account_nonce(Some(ADDRESS), Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Backend(_)));
        assert_eq!(err.to_string(), "node unavailable");
        assert_eq!(mock.calls(), 1);

        let err = dispatcher.gas_prices().await.unwrap_err();
        assert_eq!(err.to_string(), "node unavailable");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn custom_rpc_forwards_body_verbatim() {
        let reply = json!({ "jsonrpc": "2.0", "id": 9, "result": "0x10" });
        let mock = MockBackend::answering(reply.clone());
        let body = json!({ "jsonrpc": "2.0", "id": 9, "method": "eth_chainId", "params": [] });
        let result = dispatcher(&mock)
            .custom_rpc(Some("1"), Some(body.clone()))
            .await
            .unwrap();
        assert_eq!(result, reply);
        assert_eq!(mock.last_body(), Some(body));
    }

    #[tokio::test]
    async fn custom_rpc_requires_chain_and_body() {
        let mock = MockBackend::answering(json!(null));
        let err = dispatcher(&mock).custom_rpc(None, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing or invalid chainId parameter; Missing or invalid body parameter"
        );
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn supported_chains_lists_registry_in_order() {
        let mock = MockBackend::answering(json!(null));
        let result = dispatcher(&mock).supported_chains().await.unwrap();
        let ids: Vec<u64> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|chain| chain["chainId"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 100]);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn each_operation_calls_its_own_backend_method() {
        let cases: [(Operation, Option<&str>); 9] = [
            (Operation::AccountAssets, Some("account_assets")),
            (Operation::AccountTransactions, Some("account_transactions")),
            (Operation::AccountNonce, Some("nonce")),
            (Operation::GasLimit, Some("estimate_gas")),
            (Operation::GasPrices, Some("current")),
            (Operation::EthPrices, Some("quote")),
            (Operation::BlockNumber, Some("block_number")),
            (Operation::CustomRpc, Some("raw")),
            (Operation::SupportedChains, None),
        ];
        for (operation, expected) in cases {
            let mock = MockBackend::answering(json!("backend says hi"));
            let dispatcher = dispatcher(&mock);
            let result = match operation {
                Operation::AccountAssets => dispatcher.account_assets(Some(ADDRESS), Some("100")).await,
                Operation::AccountTransactions => {
                    dispatcher.account_transactions(Some(ADDRESS), Some("100")).await
                }
                Operation::AccountNonce => dispatcher.account_nonce(Some(ADDRESS), Some("100")).await,
                Operation::GasLimit => dispatcher.gas_limit(Some(ADDRESS), Some("0x01"), Some("100")).await,
                Operation::GasPrices => dispatcher.gas_prices().await,
                Operation::EthPrices => dispatcher.eth_prices(Some("usd")).await,
                Operation::BlockNumber => dispatcher.block_number(Some("100")).await,
                Operation::CustomRpc => {
                    dispatcher
                        .custom_rpc(Some("100"), Some(json!({ "method": "eth_chainId" })))
                        .await
                }
                Operation::SupportedChains => dispatcher.supported_chains().await,
            }
            .unwrap();

            assert_eq!(mock.last_method(), expected, "{operation}");
            if expected.is_some() {
                assert_eq!(result, json!("backend says hi"), "{operation}");
                assert_eq!(mock.calls(), 1, "{operation}");
            } else {
                assert_eq!(mock.calls(), 0, "{operation}");
            }
            match operation {
                Operation::GasPrices | Operation::EthPrices | Operation::SupportedChains => {
                    assert_eq!(mock.last_chain(), None, "{operation}");
                }
                _ => assert_eq!(mock.last_chain(), Some(100), "{operation}"),
            }
        }
    }

    #[test]
    fn operation_names_are_stable() {
        assert_eq!(Operation::CustomRpc.to_string(), "forward-custom-rpc");
        assert_eq!(Operation::SupportedChains.as_str(), "list-supported-chains");
    }
}
