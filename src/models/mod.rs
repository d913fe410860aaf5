// src/models/mod.rs

//! Domain models for the crawler application.

mod config;
mod listing;
mod table;

// Re-export all public types
pub use config::{Config, CrawlerConfig, Location, SourceConfig};
pub use listing::{id_from_value, ImageEntry, ListingRecord, PriceDetail, PropertyImages};
pub use table::Table;
