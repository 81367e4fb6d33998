//! The three remote queries the views declare, with their cache policies.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{QueryCache, QueryKey, QueryPolicy, QueryState};
use crate::config;
use crate::models::{chart_window, ChartPoint, Coin, PriceSnapshot};
use crate::source::PriceSource;

// ---------------------------------------------------------------------------
// CoinQueries
// ---------------------------------------------------------------------------

/// Binds a [`PriceSource`] to one cache per resource kind.
///
/// | query    | key                | retry | transform            |
/// |----------|--------------------|-------|----------------------|
/// | coins    | `coins`            | 3     | first 100 coins      |
/// | chart    | `chart/{coin}`     | 1     | points 6..20         |
/// | tickers  | `tickers/{coin}`   | 0     | none                 |
pub struct CoinQueries {
    source: Arc<dyn PriceSource>,
    coins: QueryCache<Vec<Coin>>,
    chart: QueryCache<Vec<ChartPoint>>,
    tickers: QueryCache<PriceSnapshot>,
    coins_policy: QueryPolicy<Vec<Coin>, Vec<Coin>>,
    chart_policy: QueryPolicy<Vec<ChartPoint>, Vec<ChartPoint>>,
    ticker_policy: QueryPolicy<PriceSnapshot, PriceSnapshot>,
}

impl CoinQueries {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self::with_retry_delay(source, config::RETRY_DELAY)
    }

    /// Like [`new`](Self::new) with a custom base delay between retries.
    pub fn with_retry_delay(source: Arc<dyn PriceSource>, retry_delay: Duration) -> Self {
        Self {
            source,
            coins: QueryCache::new(),
            chart: QueryCache::new(),
            tickers: QueryCache::new(),
            coins_policy: QueryPolicy::with_select(|coins: Vec<Coin>| {
                coins.into_iter().take(config::COIN_LIST_LIMIT).collect()
            })
            .retry(config::COINS_RETRY)
            .retry_delay(retry_delay),
            chart_policy: QueryPolicy::with_select(chart_window)
                .retry(config::CHART_RETRY)
                .retry_delay(retry_delay),
            ticker_policy: QueryPolicy::identity()
                .retry(config::TICKER_RETRY)
                .retry_delay(retry_delay),
        }
    }

    /// The coin list.
    pub async fn coins(&self) -> QueryState<Vec<Coin>> {
        let source = self.source.clone();
        self.coins
            .fetch(&QueryKey::coins(), &self.coins_policy, move || {
                let source = source.clone();
                async move { source.coins().await }
            })
            .await
    }

    /// The windowed chart series of `coin_id`.
    pub async fn chart(&self, coin_id: &str) -> QueryState<Vec<ChartPoint>> {
        let source = self.source.clone();
        let id = coin_id.to_string();
        self.chart
            .fetch(&QueryKey::chart(coin_id), &self.chart_policy, move || {
                let source = source.clone();
                let id = id.clone();
                async move { source.chart(&id).await }
            })
            .await
    }

    /// The ticker of `coin_id`.
    pub async fn ticker(&self, coin_id: &str) -> QueryState<PriceSnapshot> {
        let source = self.source.clone();
        let id = coin_id.to_string();
        self.tickers
            .fetch(&QueryKey::tickers(coin_id), &self.ticker_policy, move || {
                let source = source.clone();
                let id = id.clone();
                async move { source.ticker(&id).await }
            })
            .await
    }

    /// Chart and ticker of `coin_id`, requested concurrently.
    pub async fn detail(
        &self,
        coin_id: &str,
    ) -> (QueryState<Vec<ChartPoint>>, QueryState<PriceSnapshot>) {
        tokio::join!(self.chart(coin_id), self.ticker(coin_id))
    }

    pub fn coins_cache(&self) -> &QueryCache<Vec<Coin>> {
        &self.coins
    }

    pub fn chart_cache(&self) -> &QueryCache<Vec<ChartPoint>> {
        &self.chart
    }

    pub fn tickers_cache(&self) -> &QueryCache<PriceSnapshot> {
        &self.tickers
    }

    /// Every key currently cached, across all resource kinds.
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys = self.coins.keys();
        keys.extend(self.chart.keys());
        keys.extend(self.tickers.keys());
        keys
    }
}
