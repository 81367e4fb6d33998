//! HTTP client for the coin list, ticker and chart services.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{CoinViewError, Result};
use crate::models::{ChartPoint, Coin, PriceSnapshot};
use crate::source::PriceSource;

/// Fetches coin data from the coinpaprika API and the companion OHLCV service.
pub struct PaprikaClient {
    client: Client,
    config: ClientConfig,
}

impl PaprikaClient {
    /// Create a client for the given endpoints.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn coins_url(&self) -> String {
        format!("{}/coins", self.config.api_base)
    }

    fn ticker_url(&self, coin_id: &str) -> String {
        format!("{}/tickers/{}", self.config.api_base, encode_segment(coin_id))
    }

    fn chart_url(&self, coin_id: &str) -> String {
        format!("{}?coinId={}", self.config.chart_base, encode_segment(coin_id))
    }

    /// GET `url` and decode the JSON body. Non-2xx statuses become
    /// [`CoinViewError::Status`].
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, key);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoinViewError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl PriceSource for PaprikaClient {
    async fn coins(&self) -> Result<Vec<Coin>> {
        self.get_json(&self.coins_url()).await
    }

    async fn chart(&self, coin_id: &str) -> Result<Vec<ChartPoint>> {
        require_id(coin_id)?;
        self.get_json(&self.chart_url(coin_id)).await
    }

    async fn ticker(&self, coin_id: &str) -> Result<PriceSnapshot> {
        require_id(coin_id)?;
        self.get_json(&self.ticker_url(coin_id)).await
    }
}

fn require_id(coin_id: &str) -> Result<()> {
    if coin_id.trim().is_empty() {
        return Err(CoinViewError::InvalidArgument(
            "coin id must not be empty".into(),
        ));
    }
    Ok(())
}

fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
