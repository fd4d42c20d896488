//! Adapters between the simulation core and the outside world.
//!
//! - Return series loading from local CSV files
//! - Strategy book parsing
//! - Local persistence of batches, aggregates and summary tables

/// Strategy book configuration.
pub mod config;
/// Data layer errors.
pub mod error;
/// File-backed repositories.
pub mod repositories;

pub use config::{StrategyBook, StrategyDefinition};
pub use error::DataError;
pub use repositories::{
    CsvSeriesLoader, LoadedSeries, ResultRepository, ReturnSeriesLoader, SeriesFormat,
};
