pub mod api;
pub mod auth;
pub mod client;
pub mod memory;
pub mod signals;

pub use api::{Document, DocumentStore, Filter, OrderBy, Query, StoreError, StoreResult};
pub use auth::{AuthSession, User};
pub use client::StoreClient;
pub use memory::MemoryStore;
pub use signals::SignalRepository;
