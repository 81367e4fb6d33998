//! Light/dark flag and the two fixed palettes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn palette(&self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Colours shared by every view, as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: &'static str,
    pub sub_text: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub coin_background: &'static str,
}

pub const LIGHT: Palette = Palette {
    text: "#2f3640",
    sub_text: "#7f8fa6",
    accent: "#4834d4",
    background: "#f5f6fa",
    coin_background: "#ffffff",
};

pub const DARK: Palette = Palette {
    text: "#f5f6fa",
    sub_text: "#a4b0be",
    accent: "#fbc531",
    background: "#2f3640",
    coin_background: "#353b48",
};

/// Process-wide dark/light flag. Clones share the same flag, so a change made
/// through one handle is seen by every view on its next render.
#[derive(Debug, Clone, Default)]
pub struct ThemeFlag(Arc<AtomicBool>);

impl ThemeFlag {
    pub fn new(dark: bool) -> Self {
        Self(Arc::new(AtomicBool::new(dark)))
    }

    pub fn is_dark(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_dark(&self, dark: bool) {
        self.0.store(dark, Ordering::Relaxed);
    }

    /// Flip the flag and return the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn theme(&self) -> Theme {
        if self.is_dark() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn palette(&self) -> &'static Palette {
        self.theme().palette()
    }
}
