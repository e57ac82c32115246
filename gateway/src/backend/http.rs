//! Shared HTTP plumbing for the backend clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::BackendError;

/// Builds the client every backend shares.
pub(super) fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Sends `request` and decodes a 2xx JSON body.
///
/// URLs are stripped from transport errors: RPC URLs may embed an API key.
pub(super) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Transport {
            service,
            detail: e.without_url().to_string(),
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            service,
            status: status.as_u16(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::decode(service, e.without_url().to_string()))
}
