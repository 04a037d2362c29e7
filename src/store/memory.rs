use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::api::{Document, DocumentStore, Query, StoreError, StoreResult};

/// In-memory document store with the same filter/order semantics as the
/// hosted backend. Used by tests and offline runs.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> StoreResult<Document> {
        let document = Document {
            id: Uuid::new_v4().to_string(),
            data,
        };

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn list(&self, collection: &str, query: Query) -> StoreResult<Vec<Document>> {
        let collections = self.collections.lock().unwrap();
        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| {
                        query
                            .filter
                            .as_ref()
                            .map(|f| f.matches(&d.data))
                            .unwrap_or(true)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            let null = Value::Null;
            documents.sort_by(|a, b| {
                let left = a.data.get(&order.field).unwrap_or(&null);
                let right = b.data.get(&order.field).unwrap_or(&null);
                let ordering = compare_values(left, right);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> StoreResult<Document> {
        let mut collections = self.collections.lock().unwrap();
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match (&mut document.data, partial) {
            (Value::Object(data), Value::Object(fields)) => {
                for (key, value) in fields {
                    data.insert(key, value);
                }
            }
            (data, other) => *data = other,
        }

        Ok(document.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.lock().unwrap();
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let before = documents.len();
        documents.retain(|d| d.id != id);

        if documents.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
