//! Keyed in-memory query cache.
//!
//! Every remote resource is cached under a [`QueryKey`] (resource kind plus
//! coin id). A [`QueryCache`] guarantees at most one in-flight request per key:
//! concurrent callers for the same key join the running request instead of
//! issuing their own. Results live for the life of the cache; there is no
//! eviction and no expiry.
//!
//! Each entry publishes its [`QueryState`] through a `tokio::sync::watch`
//! channel, so views can either poll ([`QueryCache::state`]) or subscribe
//! ([`QueryCache::subscribe`]).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config;
use crate::error::{CoinViewError, Result};

// ---------------------------------------------------------------------------
// QueryKey
// ---------------------------------------------------------------------------

/// The kind of remote resource a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Coins,
    Chart,
    Tickers,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Coins => "coins",
            ResourceKind::Chart => "chart",
            ResourceKind::Tickers => "tickers",
        }
    }
}

/// Identity of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub id: Option<String>,
}

impl QueryKey {
    pub fn coins() -> Self {
        Self {
            kind: ResourceKind::Coins,
            id: None,
        }
    }

    pub fn chart(coin_id: &str) -> Self {
        Self {
            kind: ResourceKind::Chart,
            id: Some(coin_id.to_string()),
        }
    }

    pub fn tickers(coin_id: &str) -> Self {
        Self {
            kind: ResourceKind::Tickers,
            id: Some(coin_id.to_string()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.kind.as_str(), id),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No result yet; either never fetched or the first request is running.
    Pending,
    Error,
    Success,
}

/// Snapshot of one cache entry as seen by a view.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    /// Last successful value. Kept when a later refetch fails.
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<CoinViewError>>,
    /// Attempts made by the last failed request; reset on success.
    pub failure_count: u32,
    pub is_fetching: bool,
}

// Manual impls: deriving would require `T: Clone`.
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            failure_count: self.failure_count,
            is_fetching: self.is_fetching,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            failure_count: 0,
            is_fetching: false,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Convert into a `Result`, sharing the cached error on failure.
    pub fn into_result(self) -> Result<Arc<T>> {
        match (self.status, self.data, self.error) {
            (QueryStatus::Success, Some(data), _) => Ok(data),
            (_, _, Some(err)) => Err(CoinViewError::Shared(err)),
            _ => Err(CoinViewError::NotFound("query has not settled".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryPolicy
// ---------------------------------------------------------------------------

type Select<R, T> = Arc<dyn Fn(R) -> T + Send + Sync>;

/// Per-query fetch policy: how often to retry and how to transform the raw
/// result before it is cached.
pub struct QueryPolicy<R, T> {
    /// Extra attempts after the first failure.
    pub retry: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_delay: Duration,
    select: Select<R, T>,
}

impl<T: 'static> QueryPolicy<T, T> {
    /// Cache the raw result unchanged.
    pub fn identity() -> Self {
        Self::with_select(|raw| raw)
    }
}

impl<R, T> QueryPolicy<R, T> {
    /// Cache `select(raw)` instead of the raw result.
    pub fn with_select<F>(select: F) -> Self
    where
        F: Fn(R) -> T + Send + Sync + 'static,
    {
        Self {
            retry: 0,
            retry_delay: config::RETRY_DELAY,
            select: Arc::new(select),
        }
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Apply the transform step.
    pub fn select(&self, raw: R) -> T {
        (self.select)(raw)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .saturating_mul(factor)
            .min(config::MAX_RETRY_DELAY)
    }
}

impl<R, T> Clone for QueryPolicy<R, T> {
    fn clone(&self) -> Self {
        Self {
            retry: self.retry,
            retry_delay: self.retry_delay,
            select: self.select.clone(),
        }
    }
}

impl<R, T> fmt::Debug for QueryPolicy<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPolicy")
            .field("retry", &self.retry)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// QueryCache
// ---------------------------------------------------------------------------

struct Outcome<T> {
    result: std::result::Result<Arc<T>, Arc<CoinViewError>>,
    attempts: u32,
}

impl<T> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        Self {
            result: self.result.clone(),
            attempts: self.attempts,
        }
    }
}

type SharedFetch<T> = Shared<BoxFuture<'static, Outcome<T>>>;

struct Entry<T> {
    tx: watch::Sender<QueryState<T>>,
    in_flight: Option<SharedFetch<T>>,
    /// Bumped for every request started; results of older requests are dropped.
    generation: u64,
    stale: bool,
}

impl<T> Entry<T> {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::default());
        Self {
            tx,
            in_flight: None,
            generation: 0,
            stale: false,
        }
    }
}

/// Unbounded memoization cache for one resource type.
///
/// Cloning is cheap and every clone shares the same entries.
pub struct QueryCache<T> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<T>>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve `key`, calling `fetcher` only when needed.
    ///
    /// - A fresh successful entry is returned as-is; `fetcher` is not called.
    /// - If a request for `key` is already running, this call waits for it.
    /// - Otherwise a new request is started. The request runs on its own task,
    ///   so it completes and is cached even if this future is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn fetch<R, F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy<R, T>,
        fetcher: F,
    ) -> QueryState<T>
    where
        R: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let (request, generation) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

            if let Some(request) = &entry.in_flight {
                debug!(%key, "joining in-flight request");
                (request.clone(), entry.generation)
            } else if entry.tx.borrow().is_success() && !entry.stale {
                return entry.tx.borrow().clone();
            } else {
                entry.generation += 1;
                entry.stale = false;
                let request = run(key.clone(), policy.clone(), fetcher).boxed().shared();
                entry.in_flight = Some(request.clone());
                entry.tx.send_modify(|state| {
                    state.is_fetching = true;
                    // with nothing to show, a refetch is a fresh load
                    if state.data.is_none() {
                        state.status = QueryStatus::Pending;
                        state.error = None;
                    }
                });

                let cache = self.clone();
                let driver = request.clone();
                let driver_key = key.clone();
                let generation = entry.generation;
                tokio::spawn(async move {
                    let outcome = driver.await;
                    cache.settle(&driver_key, generation, outcome);
                });

                (request, generation)
            }
        };

        let outcome = request.await;
        self.settle(key, generation, outcome)
    }

    /// Record the outcome of request `generation` for `key` and return the
    /// entry's current state. Idempotent: only the first call per request
    /// writes.
    fn settle(&self, key: &QueryKey, generation: u64, outcome: Outcome<T>) -> QueryState<T> {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            let mut state = QueryState::default();
            apply(&mut state, outcome);
            return state;
        };
        if entry.generation == generation && entry.in_flight.is_some() {
            entry.in_flight = None;
            entry.tx.send_modify(|state| apply(state, outcome));
        }
        let state = entry.tx.borrow().clone();
        state
    }

    /// Current state of `key`; `Pending` if it was never requested.
    pub fn state(&self, key: &QueryKey) -> QueryState<T> {
        self.lock()
            .get(key)
            .map(|entry| entry.tx.borrow().clone())
            .unwrap_or_default()
    }

    /// Subscribe to state changes of `key`, creating a pending entry if needed.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<T>> {
        self.lock()
            .entry(key.clone())
            .or_insert_with(Entry::new)
            .tx
            .subscribe()
    }

    /// Mark `key` stale so the next [`fetch`](Self::fetch) re-requests it.
    /// The cached value stays visible until the new request settles.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.lock().get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn apply<T>(state: &mut QueryState<T>, outcome: Outcome<T>) {
    state.is_fetching = false;
    match outcome.result {
        Ok(data) => {
            state.status = QueryStatus::Success;
            state.data = Some(data);
            state.error = None;
            state.failure_count = 0;
        }
        Err(err) => {
            state.status = QueryStatus::Error;
            state.error = Some(err);
            state.failure_count = outcome.attempts;
        }
    }
}

async fn run<R, T, F, Fut>(key: QueryKey, policy: QueryPolicy<R, T>, fetcher: F) -> Outcome<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(raw) => {
                debug!(%key, attempts = attempt + 1, "query succeeded");
                return Outcome {
                    result: Ok(Arc::new(policy.select(raw))),
                    attempts: attempt + 1,
                };
            }
            Err(err) if attempt < policy.retry => {
                warn!(%key, attempt = attempt + 1, error = %err, "query failed, retrying");
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(%key, attempts = attempt + 1, error = %err, "query failed");
                return Outcome {
                    result: Err(Arc::new(err)),
                    attempts: attempt + 1,
                };
            }
        }
    }
}

// ---------------------------------------------------------------------------
// QueryObserver
// ---------------------------------------------------------------------------

/// Tracks the dependency key of one view query.
///
/// When the view's route parameter changes, [`set_key`](Self::set_key) reports
/// that the key changed so the caller can fetch the new entry. Reading the
/// state never triggers a fetch.
pub struct QueryObserver<T> {
    cache: QueryCache<T>,
    key: Option<QueryKey>,
    rx: Option<watch::Receiver<QueryState<T>>>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub fn new(cache: QueryCache<T>) -> Self {
        Self {
            cache,
            key: None,
            rx: None,
        }
    }

    /// Point the observer at `key`. Returns `true` if the key changed.
    pub fn set_key(&mut self, key: QueryKey) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.rx = Some(self.cache.subscribe(&key));
        self.key = Some(key);
        true
    }

    /// Stop observing. The cached entry is kept.
    pub fn clear(&mut self) {
        self.key = None;
        self.rx = None;
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Latest state of the observed entry.
    pub fn current(&self) -> QueryState<T> {
        self.rx
            .as_ref()
            .map(|rx| rx.borrow().clone())
            .unwrap_or_default()
    }

    /// Wait until the observed entry changes. Returns `false` if nothing is
    /// observed.
    pub async fn changed(&mut self) -> bool {
        match self.rx.as_mut() {
            Some(rx) => rx.changed().await.is_ok(),
            None => false,
        }
    }
}
