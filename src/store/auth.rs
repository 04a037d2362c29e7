use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Tracks the current backend session and fans out changes to subscribers.
pub struct AuthSession {
    tx: watch::Sender<Option<User>>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, user: Option<User>) {
        // send_replace so the update goes out even with no subscribers yet
        self.tx.send_replace(user);
    }

    /// Subscribe to session changes (login, logout, expiry).
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
