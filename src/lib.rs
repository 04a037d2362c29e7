pub mod agent;
pub mod config;
pub mod market;
pub mod signals;
pub mod simulation;
pub mod store;
pub mod watchlist;
