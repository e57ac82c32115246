//! ETH Gas Station price feed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::send_json;
use super::{BackendError, GasPriceOracle};

const SERVICE: &str = "gas price oracle";

/// Feed prices are in tenths of a gwei, waits in minutes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasStationFeed {
    safe_low: f64,
    average: f64,
    fast: f64,
    safe_low_wait: f64,
    avg_wait: f64,
    fast_wait: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct GasPrice {
    /// Expected confirmation time in minutes.
    time: f64,
    /// Price in gwei.
    price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct GasPrices {
    slow: GasPrice,
    average: GasPrice,
    fast: GasPrice,
}

impl From<GasStationFeed> for GasPrices {
    fn from(feed: GasStationFeed) -> Self {
        let tier = |price: f64, time: f64| GasPrice {
            time,
            price: price / 10.0,
        };
        Self {
            slow: tier(feed.safe_low, feed.safe_low_wait),
            average: tier(feed.average, feed.avg_wait),
            fast: tier(feed.fast, feed.fast_wait),
        }
    }
}

/// Gas price oracle backed by an ETH Gas Station compatible JSON feed.
#[derive(Debug, Clone)]
pub struct GasStationOracle {
    client: Client,
    url: String,
}

impl GasStationOracle {
    /// Creates an oracle polling `url` on demand.
    #[must_use]
    pub const fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl GasPriceOracle for GasStationOracle {
    async fn current(&self) -> Result<Value, BackendError> {
        let feed: GasStationFeed = send_json(SERVICE, self.client.get(&self.url)).await?;
        serde_json::to_value(GasPrices::from(feed))
            .map_err(|e| BackendError::decode(SERVICE, e.to_string()))
    }
}
