use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::signals::Signal;

use super::api::{DocumentStore, Filter, OrderBy, Query, StoreError, StoreResult};

const COLLECTION: &str = "signals";

/// Persists signal records through the document store. Every write here is
/// best-effort caching: callers log failures and move on.
pub struct SignalRepository {
    store: Arc<dyn DocumentStore>,
}

impl SignalRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, signal: &Signal) -> StoreResult<()> {
        let data = serde_json::to_value(signal)?;
        self.store.create(COLLECTION, data).await?;
        Ok(())
    }

    /// Patch the stored record after a close. The record is located by the
    /// signal's own id, not the store's document id.
    pub async fn mark_closed(&self, signal: &Signal) -> StoreResult<()> {
        let query = Query {
            filter: Some(Filter::eq("id", signal.id.to_string())),
            order_by: None,
            limit: Some(1),
        };

        let documents = self.store.list(COLLECTION, query).await?;
        let document = documents
            .first()
            .ok_or_else(|| StoreError::NotFound(signal.id.to_string()))?;

        let partial = json!({
            "open": false,
            "close_reason": signal.close_reason,
            "performance_pct": signal.performance_pct,
            "updated_at": signal.updated_at,
        });

        self.store.update(COLLECTION, &document.id, partial).await?;
        Ok(())
    }

    /// Load open signals for a session restore, newest first.
    pub async fn load_open(&self, limit: usize) -> StoreResult<Vec<Signal>> {
        let query = Query {
            filter: Some(Filter::eq("open", true)),
            order_by: Some(OrderBy::desc("created_at")),
            limit: Some(limit),
        };

        let documents = self.store.list(COLLECTION, query).await?;
        let mut signals = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<Signal>(document.data) {
                Ok(signal) => signals.push(signal),
                Err(e) => warn!("⚠️ Skipping malformed signal record {}: {}", document.id, e),
            }
        }

        Ok(signals)
    }
}
