//! The seam between the query layer and the remote pricing services.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChartPoint, Coin, PriceSnapshot};

/// A source of coin, chart and ticker data.
///
/// [`PaprikaClient`](crate::client::PaprikaClient) is the production
/// implementation. Implementations do not retry; retry is a policy of the
/// query cache.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// The full coin list.
    async fn coins(&self) -> Result<Vec<Coin>>;

    /// The raw historical series for a coin, oldest first.
    async fn chart(&self, coin_id: &str) -> Result<Vec<ChartPoint>>;

    /// The current ticker for a coin.
    async fn ticker(&self, coin_id: &str) -> Result<PriceSnapshot>;
}
