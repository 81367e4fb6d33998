//! coinview: a cryptocurrency price viewer.
//!
//! Shows a list of coins and, per coin, a ticker summary with a chart or
//! price-change tab. Data comes from the coinpaprika API and the companion
//! OHLCV chart service, and is memoized in a keyed query cache that collapses
//! concurrent identical requests into one.
//!
//! # Quick start
//!
//! ```no_run
//! use coinview::CoinView;
//!
//! # async fn run() -> coinview::Result<()> {
//! let mut app = CoinView::builder().build()?;
//!
//! // List page
//! let page = app.visit("/", None).await?;
//! println!("{page}");
//!
//! // Detail page, price tab
//! app.visit("/btc-bitcoin", None).await?;
//! app.set_tab(coinview::Tab::Price)?;
//! println!("{}", app.screen());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod queries;
pub mod router;
pub mod source;
pub mod theme;
pub mod views;

pub use cache::{QueryCache, QueryKey, QueryPolicy, QueryState, QueryStatus, ResourceKind};
pub use client::PaprikaClient;
pub use config::ClientConfig;
pub use error::{CoinViewError, Result};
pub use queries::CoinQueries;
pub use router::{LocationState, Route, Router};
pub use source::PriceSource;
pub use theme::{Palette, Theme, ThemeFlag};
pub use views::{Page, Tab};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use views::{CoinDetailView, CoinListView};

// ---------------------------------------------------------------------------
// CoinViewBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CoinView`] instance.
pub struct CoinViewBuilder {
    config: ClientConfig,
    source: Option<Arc<dyn PriceSource>>,
    theme: ThemeFlag,
    retry_delay: Duration,
}

impl Default for CoinViewBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            source: None,
            theme: ThemeFlag::default(),
            retry_delay: config::RETRY_DELAY,
        }
    }
}

impl CoinViewBuilder {
    /// Start from the `COINVIEW_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
            theme: ThemeFlag::new(config::dark_from_env()),
            ..Self::default()
        }
    }

    /// Replace the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Base URL of the coin list and ticker API.
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.config.api_base = url.into();
        self
    }

    /// Base URL of the chart service.
    pub fn chart_base(mut self, url: impl Into<String>) -> Self {
        self.config.chart_base = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Use `source` instead of the HTTP client. The client configuration is
    /// ignored when a source is given.
    pub fn source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Share an existing theme flag.
    pub fn theme(mut self, theme: ThemeFlag) -> Self {
        self.theme = theme;
        self
    }

    pub fn dark(self, dark: bool) -> Self {
        self.theme.set_dark(dark);
        self
    }

    /// Base delay between retries of a failed query. Defaults to 1 second.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn build(self) -> Result<CoinView> {
        let source: Arc<dyn PriceSource> = match self.source {
            Some(source) => source,
            None => Arc::new(PaprikaClient::new(self.config)?),
        };
        let queries = CoinQueries::with_retry_delay(source, self.retry_delay);
        let list = CoinListView::new(queries.coins_cache().clone());
        let detail = CoinDetailView::new(
            queries.chart_cache().clone(),
            queries.tickers_cache().clone(),
        );
        let mut app = CoinView {
            queries,
            router: Router::new(),
            theme: self.theme,
            list,
            detail,
        };
        app.sync_view();
        Ok(app)
    }
}

// ---------------------------------------------------------------------------
// CoinView
// ---------------------------------------------------------------------------

/// The application: router, views, query cache and theme.
///
/// Navigation is synchronous and only selects a view and its query keys;
/// [`load()`](Self::load) performs the fetches the current view declared and
/// [`screen()`](Self::screen) renders whatever the cache holds.
pub struct CoinView {
    queries: CoinQueries,
    router: Router,
    theme: ThemeFlag,
    list: CoinListView,
    detail: CoinDetailView,
}

impl CoinView {
    pub fn builder() -> CoinViewBuilder {
        CoinViewBuilder::default()
    }

    // -- Navigation --------------------------------------------------------

    /// Navigate to `path`. Returns `true` if the new view's query keys changed
    /// and [`load()`](Self::load) will fetch.
    pub fn navigate(&mut self, path: &str, state: Option<LocationState>) -> Result<bool> {
        self.router.navigate(path, state)?;
        Ok(self.sync_view())
    }

    /// Go back one step in history. Returns `false` if there is no history.
    pub fn back(&mut self) -> bool {
        if !self.router.back() {
            return false;
        }
        self.sync_view();
        true
    }

    /// Mount the view for the current route.
    fn sync_view(&mut self) -> bool {
        match self.router.current() {
            Route::List => {
                self.detail.unmount();
                self.list.mount()
            }
            Route::Detail { coin_id, state } => {
                let (coin_id, state) = (coin_id.clone(), state.clone());
                self.detail.set_route(&coin_id, state)
            }
        }
    }

    /// Fetch everything the current view needs. Cached results are reused;
    /// the detail page requests its chart and ticker concurrently.
    pub async fn load(&self) {
        match self.router.current() {
            Route::List => {
                self.queries.coins().await;
            }
            Route::Detail { coin_id, .. } => {
                self.queries.detail(coin_id).await;
            }
        }
    }

    /// Navigate, load, and render.
    pub async fn visit(&mut self, path: &str, state: Option<LocationState>) -> Result<Page> {
        self.navigate(path, state)?;
        self.load().await;
        Ok(self.screen())
    }

    // -- Local view state --------------------------------------------------

    /// Switch the detail page tab. Never fetches.
    pub fn set_tab(&mut self, tab: Tab) -> Result<()> {
        match self.router.current() {
            Route::Detail { .. } => {
                self.detail.set_tab(tab);
                Ok(())
            }
            Route::List => Err(CoinViewError::InvalidArgument(
                "tabs exist only on a coin page".into(),
            )),
        }
    }

    pub fn tab(&self) -> Tab {
        self.detail.tab()
    }

    // -- Rendering ---------------------------------------------------------

    /// Render the current view with the current palette.
    pub fn screen(&self) -> Page {
        let palette = self.theme.palette();
        match self.router.current() {
            Route::List => self.list.render(palette),
            Route::Detail { .. } => self.detail.render(palette),
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    pub fn theme(&self) -> &ThemeFlag {
        &self.theme
    }

    pub fn queries(&self) -> &CoinQueries {
        &self.queries
    }

    pub fn list_view(&self) -> &CoinListView {
        &self.list
    }

    pub fn detail_view(&self) -> &CoinDetailView {
        &self.detail
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CoinView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.queries.keys().iter().map(|k| k.to_string()).collect();
        write!(
            f,
            "CoinView(route={}, theme={}, cached=[{}])",
            self.router.current(),
            self.theme.theme(),
            keys.join(", ")
        )
    }
}
