use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::MarketConfig;

use super::api::MarketFeed;
use super::sample;
use super::types::{GlobalStats, MarketSnapshot};

// Provider caps market pages at 250 rows; larger limits are paged internally.
const PAGE_CAP: usize = 250;
const MAX_RETRIES: u32 = 3;

pub struct MarketDataClient {
    http_client: reqwest::Client,
    base_url: String,
    backoff_base: Duration,
}

#[async_trait]
impl MarketFeed for MarketDataClient {
    async fn list_top_markets(&self, limit: usize) -> Result<Vec<MarketSnapshot>> {
        let mut snapshots: Vec<MarketSnapshot> = Vec::with_capacity(limit);
        let mut page = 1usize;

        while snapshots.len() < limit {
            let per_page = (limit - snapshots.len()).min(PAGE_CAP);
            let url = format!(
                "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page={}",
                self.base_url, per_page, page
            );

            let rows: Vec<CoinMarketRow> = match self.get_with_retry(&url).await {
                Ok(rows) => rows,
                Err(e) => {
                    if snapshots.is_empty() {
                        warn!("⚠️ Market data unavailable ({}), using built-in sample", e);
                        return Ok(sample::fallback_snapshots());
                    }
                    warn!("⚠️ Page {} failed ({}), returning {} rows fetched so far", page, e, snapshots.len());
                    break;
                }
            };

            let fetched = rows.len();
            snapshots.extend(rows.into_iter().map(CoinMarketRow::into_snapshot));

            // Short page means the provider ran out of markets
            if fetched < per_page {
                break;
            }
            page += 1;
        }

        info!("📊 Fetched {} market snapshots", snapshots.len());
        Ok(snapshots)
    }

    async fn global_stats(&self) -> Result<GlobalStats> {
        let url = format!("{}/global", self.base_url);
        match self.get_with_retry::<GlobalResponse>(&url).await {
            Ok(resp) => Ok(resp.data.into_stats()),
            Err(e) => {
                warn!("⚠️ Global stats unavailable ({}), using built-in sample", e);
                Ok(sample::fallback_stats())
            }
        }
    }
}

impl MarketDataClient {
    pub fn new(config: &MarketConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(None)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Shrink the backoff for tests so retry exhaustion stays fast.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// GET + JSON decode with exponential backoff (1s, 2s, 4s by default).
    async fn get_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut delay = self.backoff_base;
        let mut last_err = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                debug!("⏳ Retry {}/{} for {} in {:?}", attempt, MAX_RETRIES, url, delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
            }

            match self.try_get(url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("Request failed (attempt {}): {}", attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request failed: {}", url)))
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("market API returned status {}", response.status());
        }

        Ok(response.json().await?)
    }
}

/// Row shape of the provider's /coins/markets endpoint.
#[derive(Debug, Clone, Deserialize)]
struct CoinMarketRow {
    id: String,
    symbol: String,
    current_price: Option<f64>,
    price_change_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
}

impl CoinMarketRow {
    fn into_snapshot(self) -> MarketSnapshot {
        MarketSnapshot {
            id: self.id,
            symbol: self.symbol.to_uppercase(),
            price: self.current_price.unwrap_or(0.0),
            change_24h: self.price_change_24h.unwrap_or(0.0),
            pct_change_24h: self.price_change_percentage_24h.unwrap_or(0.0),
            volume_24h: self.total_volume.unwrap_or(0.0),
            market_cap: self.market_cap.unwrap_or(0.0),
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
}

impl GlobalData {
    fn into_stats(self) -> GlobalStats {
        GlobalStats {
            total_market_cap: self.total_market_cap.get("usd").copied().unwrap_or(0.0),
            total_volume: self.total_volume.get("usd").copied().unwrap_or(0.0),
            btc_dominance_pct: self.market_cap_percentage.get("btc").copied().unwrap_or(0.0),
        }
    }
}
