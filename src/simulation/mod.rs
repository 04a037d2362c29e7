use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use tracing::info;

use crate::market::{sample, GlobalStats, MarketFeed, MarketSnapshot};

/// Offline market feed for demos and loop tests. Prices wobble
/// deterministically per poll so reticks see movement without a network.
pub struct MarketSimulator {
    state: Mutex<SimState>,
}

struct SimState {
    snapshots: Vec<MarketSnapshot>,
    tick: u64,
}

impl MarketSimulator {
    pub fn new() -> Self {
        Self::with_snapshots(sample::fallback_snapshots())
    }

    pub fn with_snapshots(snapshots: Vec<MarketSnapshot>) -> Self {
        info!("🎞️  Simulator loaded {} markets", snapshots.len());
        Self {
            state: Mutex::new(SimState { snapshots, tick: 0 }),
        }
    }
}

impl Default for MarketSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketFeed for MarketSimulator {
    async fn list_top_markets(&self, limit: usize) -> Result<Vec<MarketSnapshot>> {
        let mut state = self.state.lock().unwrap();
        state.tick += 1;
        let tick = state.tick;

        for (i, snapshot) in state.snapshots.iter_mut().enumerate() {
            // -0.8%..+0.8% drift, phase-shifted per market
            let step = ((tick + i as u64) % 5) as f64 - 2.0;
            let factor = 1.0 + 0.004 * step;
            snapshot.price *= factor;
            snapshot.fetched_at = Utc::now();
        }

        Ok(state.snapshots.iter().take(limit).cloned().collect())
    }

    async fn global_stats(&self) -> Result<GlobalStats> {
        let state = self.state.lock().unwrap();
        let total_market_cap: f64 = state.snapshots.iter().map(|s| s.market_cap).sum();
        let total_volume: f64 = state.snapshots.iter().map(|s| s.volume_24h).sum();
        let btc_cap = state
            .snapshots
            .iter()
            .find(|s| s.symbol == "BTC")
            .map(|s| s.market_cap)
            .unwrap_or(0.0);

        Ok(GlobalStats {
            total_market_cap,
            total_volume,
            btc_dominance_pct: if total_market_cap > 0.0 {
                btc_cap / total_market_cap * 100.0
            } else {
                0.0
            },
        })
    }
}
