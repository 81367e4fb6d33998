use std::env;
use std::time::Duration;

pub const API_BASE: &str = "https://api.coinpaprika.com/v1";
pub const CHART_BASE: &str = "https://ohlcv-api.nomadcoders.workers.dev";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The list page never shows more coins than this.
pub const COIN_LIST_LIMIT: usize = 100;

/// Window of the raw chart series handed to the chart tab.
pub const CHART_WINDOW: std::ops::Range<usize> = 6..20;

pub const CHART_RETRY: u32 = 1;
pub const TICKER_RETRY: u32 = 0;
pub const COINS_RETRY: u32 = 3;

/// Base delay between retry attempts; doubles per attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

pub const ENV_API_BASE: &str = "COINVIEW_API_BASE";
pub const ENV_CHART_BASE: &str = "COINVIEW_CHART_BASE";
pub const ENV_API_KEY: &str = "COINVIEW_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "COINVIEW_TIMEOUT_SECS";
pub const ENV_DARK: &str = "COINVIEW_DARK";

/// Connection settings for the remote pricing services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub chart_base: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            chart_base: CHART_BASE.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Build a config from `COINVIEW_*` environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base) = lookup(ENV_API_BASE).filter(|s| !s.trim().is_empty()) {
            config.api_base = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(base) = lookup(ENV_CHART_BASE).filter(|s| !s.trim().is_empty()) {
            config.chart_base = base.trim().trim_end_matches('/').to_string();
        }
        config.api_key = lookup(ENV_API_KEY).filter(|s| !s.trim().is_empty());
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Whether `COINVIEW_DARK` asks for the dark palette.
pub fn dark_from_env() -> bool {
    parse_flag(env::var(ENV_DARK).ok().as_deref())
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on" | "dark")
    )
}
