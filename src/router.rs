//! Path routing between the coin list and the coin detail page.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoinViewError, Result};

/// State carried along with a navigation, e.g. from a list entry to its
/// detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationState {
    pub name: String,
}

impl LocationState {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,
    /// `/:coinId`
    Detail {
        coin_id: String,
        state: Option<LocationState>,
    },
}

impl Route {
    /// Match `path` against `/` and `/:coinId`.
    ///
    /// Query strings, fragments and a trailing slash are ignored. The coin id
    /// segment is percent-decoded. Any other shape is a `NotFound` error.
    pub fn parse(path: &str) -> Result<Route> {
        if !path.starts_with('/') {
            return Err(CoinViewError::InvalidArgument(format!(
                "path must start with '/': {path:?}"
            )));
        }
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(Route::List),
            [segment] => {
                let coin_id = urlencoding::decode(segment).map_err(|e| {
                    CoinViewError::InvalidArgument(format!("bad coin id {segment:?}: {e}"))
                })?;
                Ok(Route::Detail {
                    coin_id: coin_id.into_owned(),
                    state: None,
                })
            }
            _ => Err(CoinViewError::NotFound(format!("no route for {path:?}"))),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Detail { coin_id, .. } => {
                format!("/{}", urlencoding::encode(coin_id))
            }
        }
    }

    pub fn coin_id(&self) -> Option<&str> {
        match self {
            Route::List => None,
            Route::Detail { coin_id, .. } => Some(coin_id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Current route plus a back stack.
#[derive(Debug)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            current: Route::List,
            history: Vec::new(),
        }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Navigate to `path`, attaching `state` when it is a detail route.
    ///
    /// On error the current route is unchanged.
    pub fn navigate(&mut self, path: &str, state: Option<LocationState>) -> Result<&Route> {
        let route = match Route::parse(path)? {
            Route::Detail { coin_id, .. } => Route::Detail { coin_id, state },
            Route::List => Route::List,
        };
        info!(from = %self.current, to = %route, "navigate");
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous);
        Ok(&self.current)
    }

    /// Return to the previous route. Returns `false` if there is none.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(route) => {
                info!(from = %self.current, to = %route, "back");
                self.current = route;
                true
            }
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}
