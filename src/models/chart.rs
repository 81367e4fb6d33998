use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ChartPoint — One OHLCV sample of a coin's history
// ---------------------------------------------------------------------------

/// A historical sample. The chart service encodes prices as strings, so the
/// numeric fields accept either JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time_open: i64,
    #[serde(default)]
    pub time_close: Option<i64>,
    #[serde(deserialize_with = "number_or_string")]
    pub open: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub high: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub low: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub close: f64,
    #[serde(default, deserialize_with = "opt_number_or_string")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "opt_number_or_string")]
    pub market_cap: Option<f64>,
}

impl ChartPoint {
    /// Sample time, unix seconds.
    pub fn time(&self) -> i64 {
        self.time_open
    }

    /// Sample price (the closing price of the interval).
    pub fn price(&self) -> f64 {
        self.close
    }
}

/// Take the fixed window of a raw series that the chart tab displays.
///
/// A series too short to cover the whole window yields nothing rather than a
/// partial window.
pub fn chart_window(series: Vec<ChartPoint>) -> Vec<ChartPoint> {
    let window = crate::config::CHART_WINDOW;
    if series.len() < window.end {
        return Vec::new();
    }
    series
        .into_iter()
        .skip(window.start)
        .take(window.len())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid number: {s:?}"))),
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn opt_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: i64) -> ChartPoint {
        ChartPoint {
            time_open: t,
            time_close: None,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: None,
            market_cap: None,
        }
    }

    #[test]
    fn deserializes_string_prices() {
        let json = r#"{"time_open":1700000000,"time_close":1700086399,
            "open":"37000.5","high":"37500","low":"36800.25","close":"37200.125",
            "volume":"1000","market_cap":720000000000}"#;
        let p: ChartPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.time(), 1700000000);
        assert_eq!(p.open, 37000.5);
        assert_eq!(p.price(), 37200.125);
        assert_eq!(p.volume, Some(1000.0));
        assert_eq!(p.market_cap, Some(720000000000.0));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let json = r#"{"time_open":1,"open":"abc","high":1,"low":1,"close":1}"#;
        assert!(serde_json::from_str::<ChartPoint>(json).is_err());
    }

    #[test]
    fn window_of_long_series_is_six_to_twenty() {
        let series: Vec<ChartPoint> = (0..30).map(point).collect();
        let times: Vec<i64> = chart_window(series).iter().map(|p| p.time()).collect();
        assert_eq!(times, (6..20).collect::<Vec<i64>>());
    }

    #[test]
    fn window_of_short_series_is_empty() {
        assert!(chart_window((0..19).map(point).collect()).is_empty());
        assert!(chart_window((0..10).map(point).collect()).is_empty());
        assert!(chart_window(Vec::new()).is_empty());
    }

    #[test]
    fn window_of_exact_series_is_last_fourteen() {
        let times: Vec<i64> = chart_window((0..20).map(point).collect())
            .iter()
            .map(|p| p.time())
            .collect();
        assert_eq!(times, (6..20).collect::<Vec<i64>>());
    }
}
