//! Configuration errors.
//!
//! Every error in this module is detected before a batch starts; once inputs
//! are validated a simulation run is pure arithmetic and cannot fail.

use thiserror::Error;

/// Invalid simulation inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The return series has no observations.
    #[error("return series for {ticker} is empty")]
    EmptySeries {
        /// Index identifier.
        ticker: String,
    },

    /// A return ratio is NaN, infinite, or not strictly positive.
    #[error("return series for {ticker} has invalid ratio {value} at index {index}")]
    InvalidReturn {
        /// Index identifier.
        ticker: String,
        /// Position in the series.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// The batch asks for no simulations.
    #[error("number of simulations must be greater than zero")]
    NoSimulations,

    /// The duration range is inverted.
    #[error("minimum duration ({min_years}y) exceeds maximum duration ({max_years}y)")]
    InvertedDurationRange {
        /// Lower bound in years.
        min_years: u32,
        /// Upper bound in years.
        max_years: u32,
    },

    /// The longest duration does not fit in a count of trading days.
    #[error("maximum duration of {max_years}y is too long")]
    DurationTooLong {
        /// Upper bound in years.
        max_years: u32,
    },

    /// A duration of zero years was requested.
    #[error("duration must be at least one year")]
    ZeroDuration,

    /// A strategy parameter is out of bounds.
    #[error("invalid {field}: {value} ({reason})")]
    InvalidParameter {
        /// Name of the parameter.
        field: &'static str,
        /// Supplied value.
        value: f64,
        /// Bound that was violated.
        reason: &'static str,
    },

    /// Bootstrap block length of zero.
    #[error("mean block length must be at least one trading day")]
    InvalidBlockLength,
}

impl ConfigurationError {
    pub(crate) fn parameter(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            field,
            value,
            reason,
        }
    }
}
