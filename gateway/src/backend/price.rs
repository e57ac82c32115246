//! CryptoCompare fiat price client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::http::send_json;
use super::{BackendError, PriceOracle};
use crate::validate::FiatList;

const SERVICE: &str = "price oracle";

/// CryptoCompare reports failures with HTTP 200 and a `Response: "Error"` body.
fn check_body(body: Value) -> Result<Value, BackendError> {
    if body.get("Response").and_then(Value::as_str) == Some("Error") {
        let message = body
            .get("Message")
            .and_then(Value::as_str)
            .unwrap_or("price oracle returned an error");
        return Err(BackendError::Upstream(message.to_owned()));
    }
    if !body.is_object() {
        return Err(BackendError::decode(SERVICE, "expected a JSON object"));
    }
    Ok(body)
}

/// Price oracle backed by CryptoCompare's `data/price` endpoint.
#[derive(Debug, Clone)]
pub struct CryptoCompareOracle {
    client: Client,
    url: String,
    base_symbol: String,
}

impl CryptoCompareOracle {
    /// Creates an oracle quoting `base_symbol` against requested fiat symbols.
    #[must_use]
    pub const fn new(client: Client, url: String, base_symbol: String) -> Self {
        Self {
            client,
            url,
            base_symbol,
        }
    }
}

#[async_trait]
impl PriceOracle for CryptoCompareOracle {
    async fn quote(&self, fiat: &FiatList) -> Result<Value, BackendError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[("fsym", self.base_symbol.as_str()), ("tsyms", fiat.as_str())]);
        check_body(send_json(SERVICE, request).await?)
    }
}
