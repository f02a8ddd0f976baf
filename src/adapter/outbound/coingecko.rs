//! CoinGecko price feed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::Prices;
use crate::error::{Error, Result};
use crate::port::PriceSource;

const COIN_IDS: &str = "ecash,bitcoin,ethereum";

/// `simple/price` response: coin id to currency to price.
type SimplePrice = HashMap<String, HashMap<String, Decimal>>;

/// Client for the CoinGecko `simple/price` endpoint.
pub struct CoinGeckoClient {
    http: HttpClient,
    api_url: String,
}

impl CoinGeckoClient {
    /// # Errors
    ///
    /// Returns an HTTP error if the client cannot be built.
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn prices(&self) -> Result<Prices> {
        let url = format!(
            "{}/simple/price?ids={COIN_IDS}&vs_currencies=usd",
            self.api_url
        );
        debug!(url = %url, "Fetching prices");

        let body: SimplePrice = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_prices(&body)
    }
}

fn parse_prices(body: &SimplePrice) -> Result<Prices> {
    let usd = |coin: &str| -> Result<Decimal> {
        body.get(coin)
            .and_then(|currencies| currencies.get("usd"))
            .copied()
            .ok_or_else(|| Error::Price(format!("no USD price for {coin}")))
    };

    Ok(Prices {
        xec_usd: usd("ecash")?,
        btc_usd: usd("bitcoin")?,
        eth_usd: usd("ethereum")?,
    })
}
