use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceSnapshot — Current ticker for one coin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: i64,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub quotes: Quotes,
}

impl PriceSnapshot {
    /// The USD quote, which is the only currency the views display.
    pub fn usd(&self) -> &UsdQuote {
        &self.quotes.usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotes {
    #[serde(rename = "USD")]
    pub usd: UsdQuote,
}

// ---------------------------------------------------------------------------
// UsdQuote — Price statistics in USD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdQuote {
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub percent_change_24h: f64,
    #[serde(default)]
    pub volume_24h_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_15m: Option<f64>,
    #[serde(default)]
    pub percent_change_30m: Option<f64>,
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    #[serde(default)]
    pub percent_change_6h: Option<f64>,
    #[serde(default)]
    pub percent_change_12h: Option<f64>,
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
    #[serde(default)]
    pub percent_change_30d: Option<f64>,
    #[serde(default)]
    pub percent_change_1y: Option<f64>,
    #[serde(default)]
    pub ath_price: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default)]
    pub percent_from_price_ath: Option<f64>,
}

impl UsdQuote {
    /// Percent changes over every window the ticker reports, shortest first.
    /// Windows the service left out are skipped.
    pub fn changes(&self) -> Vec<(&'static str, f64)> {
        [
            ("15m", self.percent_change_15m),
            ("30m", self.percent_change_30m),
            ("1h", self.percent_change_1h),
            ("6h", self.percent_change_6h),
            ("12h", self.percent_change_12h),
            ("24h", Some(self.percent_change_24h)),
            ("7d", self.percent_change_7d),
            ("30d", self.percent_change_30d),
            ("1y", self.percent_change_1y),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}
