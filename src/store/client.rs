use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use super::api::{Document, DocumentStore, Query, StoreError, StoreResult};
use super::auth::{AuthSession, User};

const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for the hosted document store / auth backend.
pub struct StoreClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: AuthSession,
}

impl StoreClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session: AuthSession::new(),
        }
    }

    /// Look up the account behind the API key. 401 means anonymous, which
    /// is fine - all writes are best-effort caching anyway.
    pub async fn current_user(&self) -> StoreResult<Option<User>> {
        let url = format!("{}/account", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            self.session.set(None);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let user: User = response.json().await?;
        info!("🔐 Signed in as {}", user.id);
        self.session.set(Some(user.clone()));
        Ok(Some(user))
    }

    pub async fn logout(&self) -> StoreResult<()> {
        let url = format!("{}/account/session", self.base_url);
        let response = self
            .http_client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        self.session.set(None);
        Ok(())
    }

    pub fn session_changes(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/documents", self.base_url, collection)
    }
}

#[async_trait]
impl DocumentStore for StoreClient {
    async fn create(&self, collection: &str, data: Value) -> StoreResult<Document> {
        debug!("📤 create in {}", collection);
        let response = self
            .http_client
            .post(self.documents_url(collection))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "data": data }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn list(&self, collection: &str, query: Query) -> StoreResult<Vec<Document>> {
        let url = format!("{}/query", self.documents_url(collection));
        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> StoreResult<Document> {
        let url = format!("{}/{}", self.documents_url(collection), id);
        let response = self
            .http_client
            .patch(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "data": partial }))
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let url = format!("{}/{}", self.documents_url(collection), id);
        let response = self
            .http_client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
