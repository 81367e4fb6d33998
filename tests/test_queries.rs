//! Query layer tests: single-flight dedup, retry policy, transforms, and
//! requests that outlive their caller.

mod common;

use std::sync::Arc;
use std::time::Duration;

use coinview::{CoinQueries, QueryKey, QueryStatus};
use common::{FakeSource, ALWAYS};

fn queries(source: &Arc<FakeSource>) -> CoinQueries {
    CoinQueries::with_retry_delay(source.clone(), Duration::ZERO)
}

// ---------------------------------------------------------------------------
// single-flight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_detail_requests_share_one_fetch_each() {
    let source = Arc::new(FakeSource::sample().with_delay(Duration::from_millis(30)));
    let q = queries(&source);

    let ((chart_a, ticker_a), (chart_b, ticker_b)) =
        tokio::join!(q.detail("btc-bitcoin"), q.detail("btc-bitcoin"));

    assert_eq!(source.chart_calls(), 1);
    assert_eq!(source.ticker_calls(), 1);
    assert!(chart_a.is_success() && chart_b.is_success());
    assert!(ticker_a.is_success() && ticker_b.is_success());
    assert!(Arc::ptr_eq(
        ticker_a.data.as_ref().unwrap(),
        ticker_b.data.as_ref().unwrap()
    ));
}

#[tokio::test]
async fn concurrent_requests_from_separate_tasks_share_one_fetch() {
    let source = Arc::new(FakeSource::sample().with_delay(Duration::from_millis(30)));
    let q = Arc::new(queries(&source));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let q = q.clone();
            tokio::spawn(async move { q.ticker("eth-ethereum").await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }
    assert_eq!(source.ticker_calls(), 1);
}

#[tokio::test]
async fn different_coins_are_fetched_separately() {
    let source = Arc::new(FakeSource::sample());
    let q = queries(&source);

    tokio::join!(q.detail("btc-bitcoin"), q.detail("eth-ethereum"));
    assert_eq!(source.chart_calls(), 2);
    assert_eq!(source.ticker_calls(), 2);
}

#[tokio::test]
async fn settled_success_is_served_from_cache() {
    let source = Arc::new(FakeSource::sample());
    let q = queries(&source);

    q.detail("btc-bitcoin").await;
    q.detail("btc-bitcoin").await;
    q.coins().await;
    q.coins().await;
    assert_eq!(source.chart_calls(), 1);
    assert_eq!(source.ticker_calls(), 1);
    assert_eq!(source.coins_calls(), 1);
}

// ---------------------------------------------------------------------------
// retry policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_chart_retries_exactly_once() {
    let source = Arc::new(FakeSource::sample().fail_chart("btc-bitcoin", ALWAYS));
    let q = queries(&source);

    let state = q.chart("btc-bitcoin").await;
    assert_eq!(state.status, QueryStatus::Error);
    assert!(state.error.is_some());
    assert_eq!(state.failure_count, 2);
    assert_eq!(source.chart_calls(), 2);
}

#[tokio::test]
async fn chart_recovers_on_its_retry() {
    let source = Arc::new(FakeSource::sample().fail_chart("btc-bitcoin", 1));
    let q = queries(&source);

    let state = q.chart("btc-bitcoin").await;
    assert!(state.is_success());
    assert_eq!(source.chart_calls(), 2);
}

#[tokio::test]
async fn failing_ticker_never_retries() {
    let source = Arc::new(FakeSource::sample());
    let q = queries(&source);

    let state = q.ticker("doge-dogecoin").await;
    assert!(state.is_error());
    assert_eq!(state.failure_count, 1);
    assert_eq!(source.ticker_calls(), 1);
}

#[tokio::test]
async fn errored_entry_is_refetched_on_next_request() {
    let source = Arc::new(FakeSource::sample().fail_chart("btc-bitcoin", 2));
    let q = queries(&source);

    assert!(q.chart("btc-bitcoin").await.is_error());
    assert!(q.chart("btc-bitcoin").await.is_success());
    assert_eq!(source.chart_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn default_retry_waits_before_second_attempt() {
    let source = Arc::new(FakeSource::sample().fail_chart("btc-bitcoin", 1));
    let q = CoinQueries::new(source.clone());

    let start = tokio::time::Instant::now();
    assert!(q.chart("btc-bitcoin").await.is_success());
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(source.chart_calls(), 2);
}

// ---------------------------------------------------------------------------
// transforms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chart_is_windowed_to_points_six_through_nineteen() {
    let source = Arc::new(FakeSource::sample());
    let q = queries(&source);

    let state = q.chart("btc-bitcoin").await;
    let indices: Vec<usize> = state.data().unwrap().iter().map(common::series_index).collect();
    assert_eq!(indices, (6..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn short_chart_series_yields_empty_window() {
    let mut fake = FakeSource::sample();
    fake.charts
        .insert("btc-bitcoin".to_string(), common::series(12, 1.0));
    let source = Arc::new(fake);
    let q = queries(&source);

    let state = q.chart("btc-bitcoin").await;
    assert!(state.is_success());
    assert!(state.data().unwrap().is_empty());
}

#[tokio::test]
async fn coin_list_is_capped_at_one_hundred() {
    let mut fake = FakeSource::sample();
    fake.coins = (0..150)
        .map(|i| common::coin(&format!("coin-{i}"), &format!("Coin {i}"), "C", i))
        .collect();
    let source = Arc::new(fake);
    let q = queries(&source);

    let state = q.coins().await;
    let coins = state.data().unwrap();
    assert_eq!(coins.len(), 100);
    assert_eq!(coins[0].id, "coin-0");
    assert_eq!(coins[99].id, "coin-99");
}

// ---------------------------------------------------------------------------
// no cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn abandoned_request_still_completes_and_caches() {
    let source = Arc::new(FakeSource::sample().with_delay(Duration::from_millis(40)));
    let q = queries(&source);

    let abandoned = tokio::time::timeout(Duration::from_millis(5), q.ticker("btc-bitcoin")).await;
    assert!(abandoned.is_err());
    assert!(q.tickers_cache().state(&QueryKey::tickers("btc-bitcoin")).is_loading());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let state = q.tickers_cache().state(&QueryKey::tickers("btc-bitcoin"));
    assert!(state.is_success());
    assert_eq!(state.data().unwrap().symbol, "BTC");

    q.ticker("btc-bitcoin").await;
    assert_eq!(source.ticker_calls(), 1);
}

#[tokio::test]
async fn subscribers_see_the_settled_state() {
    let source = Arc::new(FakeSource::sample().with_delay(Duration::from_millis(20)));
    let q = queries(&source);
    let key = QueryKey::chart("eth-ethereum");
    let mut rx = q.chart_cache().subscribe(&key);
    assert!(rx.borrow().is_loading());

    q.chart("eth-ethereum").await;
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_success());
}
