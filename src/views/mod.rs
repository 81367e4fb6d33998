//! Views render cache state into a [`Page`]: a title plus coloured text lines.
//!
//! Rendering only reads query state; it never starts a request.

pub mod detail;
pub mod format;
pub mod list;

pub use detail::{CoinDetailView, Tab};
pub use list::CoinListView;

use std::fmt;

use crate::theme::Palette;

/// One rendered line of text with its foreground colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub color: &'static str,
}

impl Line {
    pub fn new(text: impl Into<String>, color: &'static str) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// A rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn loading(title: impl Into<String>, palette: &Palette) -> Self {
        let mut page = Self::new(title);
        page.push("Loading...", palette.sub_text);
        page
    }

    pub fn push(&mut self, text: impl Into<String>, color: &'static str) {
        self.lines.push(Line::new(text, color));
    }

    pub fn is_loading(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].text == "Loading..."
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.lines.iter().any(|l| l.text.contains(needle))
    }

    /// The first line containing `needle`.
    pub fn find(&self, needle: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.text.contains(needle))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}
