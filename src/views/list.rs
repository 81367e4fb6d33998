use crate::cache::{QueryCache, QueryKey, QueryObserver};
use crate::models::Coin;
use crate::router::LocationState;
use crate::theme::Palette;

use super::Page;

pub const TITLE: &str = "Coins";

/// The coin list page.
pub struct CoinListView {
    coins: QueryObserver<Vec<Coin>>,
}

impl CoinListView {
    pub fn new(cache: QueryCache<Vec<Coin>>) -> Self {
        Self {
            coins: QueryObserver::new(cache),
        }
    }

    /// Declare the list query. Returns `true` the first time, when a fetch
    /// is needed.
    pub fn mount(&mut self) -> bool {
        self.coins.set_key(QueryKey::coins())
    }

    pub fn is_loading(&self) -> bool {
        self.coins.current().is_loading()
    }

    /// Detail-page links for every listed coin, with the coin name as
    /// navigation state.
    pub fn links(&self) -> Vec<(String, LocationState)> {
        self.coins
            .current()
            .data()
            .map(|coins| {
                coins
                    .iter()
                    .map(|c| (c.path(), LocationState::named(c.name.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn render(&self, palette: &Palette) -> Page {
        let state = self.coins.current();
        if state.is_loading() {
            return Page::loading(TITLE, palette);
        }

        let mut page = Page::new(TITLE);
        match state.data() {
            Some(coins) => {
                for coin in coins {
                    page.push(
                        format!("{} ({})  →  {}", coin.name, coin.symbol, coin.path()),
                        palette.text,
                    );
                }
            }
            None => {
                let reason = state
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                page.push(format!("Could not load coins: {reason}"), palette.sub_text);
            }
        }
        page
    }
}
