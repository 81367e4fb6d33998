//! Shared test fixtures for the coinview integration tests.
//!
//! Provides [`FakeSource`], an in-memory [`PriceSource`] that counts every
//! request and can be told to fail or to answer slowly, and `sample_app()`
//! which wires it into a [`CoinView`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coinview::models::{ChartPoint, Coin, PriceSnapshot, Quotes, UsdQuote};
use coinview::{CoinView, CoinViewError, PriceSource, Result};

/// Fails forever when used as a failure budget.
pub const ALWAYS: usize = usize::MAX;

#[derive(Default)]
pub struct FakeSource {
    pub coins: Vec<Coin>,
    pub charts: HashMap<String, Vec<ChartPoint>>,
    pub tickers: HashMap<String, PriceSnapshot>,
    /// Remaining failures before a coin's chart succeeds.
    chart_failures: Mutex<HashMap<String, usize>>,
    delay: Duration,
    pub coins_calls: AtomicUsize,
    pub chart_calls: AtomicUsize,
    pub ticker_calls: AtomicUsize,
}

impl FakeSource {
    /// Three coins:
    /// - `btc-bitcoin`: 30 chart points, change +3.7
    /// - `eth-ethereum`: 30 chart points, change -5.2
    /// - `usdt-tether`: no chart (chart requests fail), change 0
    pub fn sample() -> Self {
        let coins = vec![
            coin("btc-bitcoin", "Bitcoin", "BTC", 1),
            coin("eth-ethereum", "Ethereum", "ETH", 2),
            coin("usdt-tether", "Tether", "USDT", 3),
        ];
        let charts = HashMap::from([
            ("btc-bitcoin".to_string(), series(30, 37_000.0)),
            ("eth-ethereum".to_string(), series(30, 2_000.0)),
        ]);
        let tickers = HashMap::from([
            (
                "btc-bitcoin".to_string(),
                ticker("btc-bitcoin", "Bitcoin", "BTC", 1, 37_210.123_4, 3.7),
            ),
            (
                "eth-ethereum".to_string(),
                ticker("eth-ethereum", "Ethereum", "ETH", 2, 2_050.5, -5.2),
            ),
            (
                "usdt-tether".to_string(),
                ticker("usdt-tether", "Tether", "USDT", 3, 1.0, 0.0),
            ),
        ]);
        Self {
            coins,
            charts,
            tickers,
            ..Self::default()
        }
    }

    /// Answer every request after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next `times` chart requests for `coin_id` fail.
    pub fn fail_chart(self, coin_id: &str, times: usize) -> Self {
        self.chart_failures
            .lock()
            .unwrap()
            .insert(coin_id.to_string(), times);
        self
    }

    pub fn coins_calls(&self) -> usize {
        self.coins_calls.load(Ordering::SeqCst)
    }

    pub fn chart_calls(&self) -> usize {
        self.chart_calls.load(Ordering::SeqCst)
    }

    pub fn ticker_calls(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    async fn coins(&self) -> Result<Vec<Coin>> {
        self.coins_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.coins.clone())
    }

    async fn chart(&self, coin_id: &str) -> Result<Vec<ChartPoint>> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        {
            let mut failures = self.chart_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(coin_id) {
                if *remaining > 0 {
                    if *remaining != ALWAYS {
                        *remaining -= 1;
                    }
                    return Err(CoinViewError::Status {
                        status: 500,
                        url: format!("fake://chart/{coin_id}"),
                    });
                }
            }
        }
        self.charts
            .get(coin_id)
            .cloned()
            .ok_or_else(|| CoinViewError::NotFound(format!("no chart for {coin_id}")))
    }

    async fn ticker(&self, coin_id: &str) -> Result<PriceSnapshot> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.tickers
            .get(coin_id)
            .cloned()
            .ok_or_else(|| CoinViewError::Status {
                status: 404,
                url: format!("fake://tickers/{coin_id}"),
            })
    }
}

/// A `CoinView` backed by `source`, with no delay between retries.
pub fn app_with(source: Arc<FakeSource>) -> CoinView {
    CoinView::builder()
        .source(source)
        .retry_delay(Duration::ZERO)
        .build()
        .unwrap()
}

pub fn sample_app() -> (CoinView, Arc<FakeSource>) {
    let source = Arc::new(FakeSource::sample());
    (app_with(source.clone()), source)
}

// -- Fixture builders -------------------------------------------------------

pub fn coin(id: &str, name: &str, symbol: &str, rank: i64) -> Coin {
    Coin {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        rank: Some(rank),
        is_new: Some(false),
        is_active: Some(true),
        type_field: Some("coin".to_string()),
    }
}

/// `len` daily points starting at 2023-11-14, with `time_open` increasing by
/// one day per index so a point's position is recoverable from its time.
pub fn series(len: usize, base: f64) -> Vec<ChartPoint> {
    (0..len)
        .map(|i| {
            let price = base + i as f64;
            ChartPoint {
                time_open: 1_700_000_000 + i as i64 * 86_400,
                time_close: Some(1_700_000_000 + i as i64 * 86_400 + 86_399),
                open: price,
                high: price + 10.0,
                low: price - 10.0,
                close: price + 5.0,
                volume: Some(1_000.0),
                market_cap: None,
            }
        })
        .collect()
}

pub fn series_index(point: &ChartPoint) -> usize {
    ((point.time_open - 1_700_000_000) / 86_400) as usize
}

pub fn ticker(id: &str, name: &str, symbol: &str, rank: i64, price: f64, change: f64) -> PriceSnapshot {
    PriceSnapshot {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        rank,
        circulating_supply: None,
        total_supply: None,
        max_supply: None,
        last_updated: None,
        quotes: Quotes {
            usd: UsdQuote {
                price,
                volume_24h: 30_120_000_000.0,
                market_cap: 712_345_678_901.0,
                percent_change_24h: change,
                volume_24h_change_24h: None,
                market_cap_change_24h: None,
                percent_change_15m: None,
                percent_change_30m: None,
                percent_change_1h: Some(0.12),
                percent_change_6h: None,
                percent_change_12h: None,
                percent_change_7d: Some(-1.5),
                percent_change_30d: None,
                percent_change_1y: None,
                ath_price: Some(68_789.63),
                ath_date: Some("2021-11-10T16:51:15Z".to_string()),
                percent_from_price_ath: Some(-45.9),
            },
        },
    }
}
