use chrono::Utc;

use super::types::{GlobalStats, MarketSnapshot};

/// Static fallback data so the dashboard never shows an empty state
/// when the market-data provider is unreachable.
pub fn fallback_snapshots() -> Vec<MarketSnapshot> {
    let now = Utc::now();
    let rows = [
        ("bitcoin", "BTC", 67_240.50, 1_310.20, 1.99, 28_400_000_000.0, 1_325_000_000_000.0),
        ("ethereum", "ETH", 3_310.25, -42.10, -1.26, 14_100_000_000.0, 398_000_000_000.0),
        ("binancecoin", "BNB", 585.10, 6.85, 1.18, 1_750_000_000.0, 85_400_000_000.0),
        ("solana", "SOL", 142.87, 3.41, 2.44, 2_900_000_000.0, 66_300_000_000.0),
        ("ripple", "XRP", 0.5234, -0.0071, -1.34, 1_200_000_000.0, 29_100_000_000.0),
    ];

    rows.iter()
        .map(|(id, symbol, price, change, pct, volume, cap)| MarketSnapshot {
            id: id.to_string(),
            symbol: symbol.to_string(),
            price: *price,
            change_24h: *change,
            pct_change_24h: *pct,
            volume_24h: *volume,
            market_cap: *cap,
            fetched_at: now,
        })
        .collect()
}

pub fn fallback_stats() -> GlobalStats {
    let snapshots = fallback_snapshots();
    let total_market_cap: f64 = snapshots.iter().map(|s| s.market_cap).sum();
    let total_volume: f64 = snapshots.iter().map(|s| s.volume_24h).sum();
    let btc_cap = snapshots
        .iter()
        .find(|s| s.symbol == "BTC")
        .map(|s| s.market_cap)
        .unwrap_or(0.0);

    GlobalStats {
        total_market_cap,
        total_volume,
        btc_dominance_pct: if total_market_cap > 0.0 {
            btc_cap / total_market_cap * 100.0
        } else {
            0.0
        },
    }
}
