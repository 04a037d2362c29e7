use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point-in-time market reading for a single asset.
/// Never persisted - the latest poll always wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub pct_change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// 24h volume relative to market cap. 0 when the cap is unknown.
    pub fn volume_ratio(&self) -> f64 {
        if self.market_cap > 0.0 {
            self.volume_24h / self.market_cap
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_market_cap: f64,
    pub total_volume: f64,
    pub btc_dominance_pct: f64,
}
