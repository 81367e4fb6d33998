use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey, QueryObserver, QueryState};
use crate::error::CoinViewError;
use crate::models::{ChartPoint, PriceSnapshot};
use crate::router::LocationState;
use crate::theme::Palette;

use super::format::{format_billions, format_date, format_price, price_change};
use super::Page;

/// Content tabs of the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chart,
    Price,
}

impl FromStr for Tab {
    type Err = CoinViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chart" => Ok(Tab::Chart),
            "price" => Ok(Tab::Price),
            other => Err(CoinViewError::InvalidArgument(format!("unknown tab: {other}"))),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Chart => f.write_str("chart"),
            Tab::Price => f.write_str("price"),
        }
    }
}

/// The per-coin page: ticker statistics plus a chart or price tab.
pub struct CoinDetailView {
    coin_id: Option<String>,
    location: Option<LocationState>,
    tab: Tab,
    chart: QueryObserver<Vec<ChartPoint>>,
    ticker: QueryObserver<PriceSnapshot>,
}

impl CoinDetailView {
    pub fn new(chart: QueryCache<Vec<ChartPoint>>, ticker: QueryCache<PriceSnapshot>) -> Self {
        Self {
            coin_id: None,
            location: None,
            tab: Tab::default(),
            chart: QueryObserver::new(chart),
            ticker: QueryObserver::new(ticker),
        }
    }

    /// Point the view at `coin_id`. Returns `true` when the coin changed and
    /// its queries need fetching; the tab then resets to the default.
    pub fn set_route(&mut self, coin_id: &str, location: Option<LocationState>) -> bool {
        self.location = location;
        let chart_changed = self.chart.set_key(QueryKey::chart(coin_id));
        let ticker_changed = self.ticker.set_key(QueryKey::tickers(coin_id));
        let changed = chart_changed || ticker_changed;
        if changed {
            self.coin_id = Some(coin_id.to_string());
            self.tab = Tab::default();
        }
        changed
    }

    /// Leave the page. Local state starts over on the next mount; cached
    /// queries are kept.
    pub fn unmount(&mut self) {
        self.coin_id = None;
        self.location = None;
        self.tab = Tab::default();
        self.chart.clear();
        self.ticker.clear();
    }

    pub fn coin_id(&self) -> Option<&str> {
        self.coin_id.as_deref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switch tabs. Local state only; no query is touched.
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn chart_state(&self) -> QueryState<Vec<ChartPoint>> {
        self.chart.current()
    }

    pub fn ticker_state(&self) -> QueryState<PriceSnapshot> {
        self.ticker.current()
    }

    /// The windowed chart series, once loaded.
    pub fn chart_data(&self) -> Option<Arc<Vec<ChartPoint>>> {
        self.chart.current().data
    }

    pub fn price_data(&self) -> Option<Arc<PriceSnapshot>> {
        self.ticker.current().data
    }

    /// Loading until both the chart and the ticker have settled.
    pub fn is_loading(&self) -> bool {
        self.chart.current().is_loading() || self.ticker.current().is_loading()
    }

    /// Carried display name, else the ticker's name, else the coin id.
    pub fn title(&self) -> String {
        if let Some(location) = &self.location {
            return location.name.clone();
        }
        if let Some(price) = self.price_data() {
            return price.name.clone();
        }
        self.coin_id.clone().unwrap_or_default()
    }

    pub fn render(&self, palette: &Palette) -> Page {
        let title = self.title();
        if self.is_loading() {
            return Page::loading(title, palette);
        }

        let ticker = self.ticker.current();
        let Some(price) = ticker.data() else {
            let mut page = Page::new(title);
            let reason = ticker
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            page.push(format!("Price data unavailable: {reason}"), palette.sub_text);
            return page;
        };

        let usd = price.usd();
        let change = price_change(usd.percent_change_24h, palette);

        let mut page = Page::new(title);
        page.push(price.symbol.clone(), palette.text);
        page.push(price.name.clone(), palette.accent);
        page.push(format_price(usd.price), palette.text);
        page.push(change.text, change.color);
        page.push(format!("Rank # {}", price.rank), palette.accent);
        page.push(
            format!("Market Cap  {}", format_billions(usd.market_cap)),
            palette.text,
        );
        page.push(
            format!("24H Volume  {}", format_billions(usd.volume_24h)),
            palette.text,
        );
        page.push(tab_bar(self.tab), palette.accent);

        match self.tab {
            Tab::Chart => self.render_chart(&mut page, palette),
            Tab::Price => render_price_tab(&mut page, price, palette),
        }
        page
    }

    fn render_chart(&self, page: &mut Page, palette: &Palette) {
        let chart = self.chart.current();
        if chart.is_error() {
            page.push("No chart available", palette.sub_text);
            return;
        }
        let points = chart.data().map(|d| d.as_slice()).unwrap_or_default();
        if points.is_empty() {
            page.push("No chart data", palette.sub_text);
            return;
        }
        for point in points {
            page.push(
                format!(
                    "{}  O {:.3}  H {:.3}  L {:.3}  C {:.3}",
                    format_date(point.time()),
                    point.open,
                    point.high,
                    point.low,
                    point.close
                ),
                palette.text,
            );
        }
    }
}

fn tab_bar(active: Tab) -> String {
    match active {
        Tab::Chart => "[Chart]  Price".to_string(),
        Tab::Price => "Chart  [Price]".to_string(),
    }
}

fn render_price_tab(page: &mut Page, price: &PriceSnapshot, palette: &Palette) {
    let usd = price.usd();
    for (window, value) in usd.changes() {
        let change = price_change(value, palette);
        page.push(format!("{window:>4}  {}", change.text), change.color);
    }
    if let Some(ath) = usd.ath_price {
        let date = usd
            .ath_date
            .as_deref()
            .and_then(|d| d.get(..10))
            .unwrap_or("");
        page.push(
            format!("ATH  {} {}", format_price(ath), date).trim_end().to_string(),
            palette.text,
        );
    }
    if let Some(from_ath) = usd.percent_from_price_ath {
        let change = price_change(from_ath, palette);
        page.push(format!("From ATH  {}", change.text), change.color);
    }
}
