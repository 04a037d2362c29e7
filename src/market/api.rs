use anyhow::Result;
use async_trait::async_trait;

use super::types::{GlobalStats, MarketSnapshot};

#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Fetch the top markets by market cap, best-effort.
    async fn list_top_markets(&self, limit: usize) -> Result<Vec<MarketSnapshot>>;

    /// Fetch aggregate market stats.
    async fn global_stats(&self) -> Result<GlobalStats>;
}
