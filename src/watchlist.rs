use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::store::{DocumentStore, Filter, Query, StoreResult};

const COLLECTION: &str = "watchlist";

/// Per-user watchlist persisted in the document store.
pub struct WatchlistService {
    store: Arc<dyn DocumentStore>,
    user_id: String,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let query = Query {
            filter: Some(Filter::eq("user_id", self.user_id.clone())),
            order_by: None,
            limit: None,
        };

        let documents = self.store.list(COLLECTION, query).await?;
        Ok(documents
            .iter()
            .filter_map(|d| d.data.get("symbol").and_then(|s| s.as_str()))
            .map(|s| s.to_string())
            .collect())
    }

    /// Add the symbol if absent, remove it if present. Returns true when
    /// the symbol ends up on the watchlist.
    pub async fn toggle(&self, symbol: &str) -> StoreResult<bool> {
        let symbol = symbol.to_uppercase();
        let query = Query {
            filter: Some(Filter::and(vec![
                Filter::eq("user_id", self.user_id.clone()),
                Filter::eq("symbol", symbol.clone()),
            ])),
            order_by: None,
            limit: Some(1),
        };

        let existing = self.store.list(COLLECTION, query).await?;
        if let Some(document) = existing.first() {
            self.store.delete(COLLECTION, &document.id).await?;
            info!("⭐ Removed {} from watchlist", symbol);
            return Ok(false);
        }

        let data = json!({
            "user_id": self.user_id,
            "symbol": symbol,
            "added_at": Utc::now(),
        });
        self.store.create(COLLECTION, data).await?;
        info!("⭐ Added {} to watchlist", symbol);
        Ok(true)
    }
}
