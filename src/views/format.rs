//! Number and date formatting shared by the views.

use chrono::DateTime;

use crate::theme::Palette;

pub const UP_COLOR: &str = "#f23d3d";
pub const DOWN_COLOR: &str = "#13bf36";

/// `$` plus three decimals.
pub fn format_price(price: f64) -> String {
    format!("${price:.3}")
}

/// Scale to billions with two decimals, e.g. `712.35B`.
pub fn format_billions(value: f64) -> String {
    format!("{:.2}B", value / 1_000_000_000.0)
}

/// Direction of a percent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Direction::Up => "▲ ",
            Direction::Down => "▼ ",
            Direction::Neutral => "",
        }
    }

    pub fn color(&self, palette: &Palette) -> &'static str {
        match self {
            Direction::Up => UP_COLOR,
            Direction::Down => DOWN_COLOR,
            Direction::Neutral => palette.text,
        }
    }
}

/// A percent change ready for display: `▲ 3.7%`, `▼ -5.2%` or `0%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceChange {
    pub direction: Direction,
    pub text: String,
    pub color: &'static str,
}

pub fn price_change(change: f64, palette: &Palette) -> PriceChange {
    let direction = Direction::of(change);
    // -0.0 prints as "-0"
    let shown = if direction == Direction::Neutral { 0.0 } else { change };
    PriceChange {
        direction,
        text: format!("{}{}%", direction.marker(), shown),
        color: direction.color(palette),
    }
}

/// Unix seconds as `YYYY-MM-DD`; out-of-range timestamps print raw.
pub fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
