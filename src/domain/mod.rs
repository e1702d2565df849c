//! Core domain types and logic: quotes, the per-instrument store, indicators
//! and the analytics built on top of them.

pub mod analytics;
pub mod error;
pub mod indicator;
pub mod loader;
pub mod quote;
pub mod quote_store;
pub mod rounding;
pub mod series;
pub mod stats;
pub mod store_config;
