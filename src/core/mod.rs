//! Core domain types, catalogs and ambient plumbing

pub mod catalog;
pub mod config;
pub mod error;
pub mod log;
pub mod series;

// Re-export main types for cleaner imports
pub use catalog::{Asset, Currency};
pub use error::HistoryError;
pub use series::{LookbackYears, PricePoint, RawSeries, SeriesFetcher};
