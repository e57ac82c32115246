//! HTTP route handlers for the gateway.
//!
//! Every JSON endpoint returns the envelope from [`crate::envelope`]; only
//! `/hello` answers with plain text. Query parameters keep their historical
//! camelCase names (`chainId`, `contractAddress`).
//!
//! Extraction never rejects on its own: unreadable query strings and request
//! bodies become validation errors inside the envelope. Unrouted paths (404)
//! and wrong methods (405) answer with the envelope too.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::{Dispatcher, GatewayError};
use crate::envelope::{StatusPolicy, respond, status_failure};
use crate::validate::ValidationErrors;

/// Shared state handed to every handler.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct AppState {
    /// Request dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Failure status mapping.
    pub policy: StatusPolicy,
}

/// Creates the router with all gateway endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hello", get(get_hello))
        .route("/account-assets", get(get_account_assets))
        .route("/account-transactions", get(get_account_transactions))
        .route("/account-nonce", get(get_account_nonce))
        .route("/gas-limit", get(get_gas_limit))
        .route("/gas-prices", get(get_gas_prices))
        .route("/eth-prices", get(get_eth_prices))
        .route("/block-number", get(get_block_number))
        .route("/custom-request", post(post_custom_request))
        .route("/supported-chains", get(get_supported_chains))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountQuery {
    address: Option<String>,
    chain_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasLimitQuery {
    contract_address: Option<String>,
    data: Option<String>,
    chain_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FiatQuery {
    fiat: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainQuery {
    chain_id: Option<String>,
}

fn query<T>(extracted: Result<Query<T>, QueryRejection>) -> Result<T, GatewayError> {
    extracted
        .map(|Query(query)| query)
        .map_err(|_| ValidationErrors::single("query").into())
}

async fn route_not_found(method: Method, uri: Uri) -> Response {
    status_failure(
        StatusCode::NOT_FOUND,
        format!("Cannot {method} {}", uri.path()),
    )
}

async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    status_failure(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} is not allowed on {}", uri.path()),
    )
}

/// `GET /hello`: liveness probe.
#[tracing::instrument(skip_all)]
async fn get_hello() -> impl IntoResponse {
    (StatusCode::OK, "Hello World")
}

/// `GET /account-assets?address&chainId`
#[tracing::instrument(skip_all)]
async fn get_account_assets(
    State(state): State<AppState>,
    extracted: Result<Query<AccountQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => {
            state
                .dispatcher
                .account_assets(q.address.as_deref(), q.chain_id.as_deref())
                .await
        }
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /account-transactions?address&chainId`
#[tracing::instrument(skip_all)]
async fn get_account_transactions(
    State(state): State<AppState>,
    extracted: Result<Query<AccountQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => {
            state
                .dispatcher
                .account_transactions(q.address.as_deref(), q.chain_id.as_deref())
                .await
        }
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /account-nonce?address&chainId`
#[tracing::instrument(skip_all)]
async fn get_account_nonce(
    State(state): State<AppState>,
    extracted: Result<Query<AccountQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => {
            state
                .dispatcher
                .account_nonce(q.address.as_deref(), q.chain_id.as_deref())
                .await
        }
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /gas-limit?contractAddress&data&chainId`: `data` defaults to `0x`.
#[tracing::instrument(skip_all)]
async fn get_gas_limit(
    State(state): State<AppState>,
    extracted: Result<Query<GasLimitQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => {
            state
                .dispatcher
                .gas_limit(
                    q.contract_address.as_deref(),
                    q.data.as_deref(),
                    q.chain_id.as_deref(),
                )
                .await
        }
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /gas-prices`
#[tracing::instrument(skip_all)]
async fn get_gas_prices(State(state): State<AppState>) -> Response {
    respond(state.policy, state.dispatcher.gas_prices().await)
}

/// `GET /eth-prices?fiat`: `fiat` defaults to `USD,EUR,GBP`.
#[tracing::instrument(skip_all)]
async fn get_eth_prices(
    State(state): State<AppState>,
    extracted: Result<Query<FiatQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => state.dispatcher.eth_prices(q.fiat.as_deref()).await,
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /block-number?chainId`
#[tracing::instrument(skip_all)]
async fn get_block_number(
    State(state): State<AppState>,
    extracted: Result<Query<ChainQuery>, QueryRejection>,
) -> Response {
    let outcome = match query(extracted) {
        Ok(q) => state.dispatcher.block_number(q.chain_id.as_deref()).await,
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `POST /custom-request?chainId`: body is forwarded to the node as-is.
#[tracing::instrument(skip_all)]
async fn post_custom_request(
    State(state): State<AppState>,
    extracted: Result<Query<ChainQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = body.ok().map(|Json(body)| body);
    let outcome = match query(extracted) {
        Ok(q) => state.dispatcher.custom_rpc(q.chain_id.as_deref(), body).await,
        Err(error) => Err(error),
    };
    respond(state.policy, outcome)
}

/// `GET /supported-chains`
#[tracing::instrument(skip_all)]
async fn get_supported_chains(State(state): State<AppState>) -> Response {
    respond(state.policy, state.dispatcher.supported_chains().await)
}
