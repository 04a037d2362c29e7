pub mod api;
pub mod client;
pub mod sample;
pub mod types;

pub use api::MarketFeed;
pub use client::MarketDataClient;
pub use types::{GlobalStats, MarketSnapshot};
