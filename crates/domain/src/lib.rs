//! Domain model for the leveraged index simulator.
//!
//! This crate holds the data model shared by the simulation engine and its
//! adapters:
//! - Historical return series and validated strategy parameters
//! - The leverage/fee model applied to each trading day
//! - Path metrics (drawdown, annualized return, percentiles)
//! - Configuration errors raised before any simulation runs

/// Entities: return series and strategy parameters.
pub mod entities;
/// Strategy and sampling enumerations.
pub mod enums;
/// Configuration errors.
pub mod error;
/// Leverage and fee model.
pub mod fees;
/// Path metrics.
pub mod metrics;
/// Value objects.
pub mod value_objects;

/// Trading days per calendar year.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

pub use error::ConfigurationError;
