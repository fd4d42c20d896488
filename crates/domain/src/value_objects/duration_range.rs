use crate::TRADING_DAYS_PER_YEAR;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Inclusive range of investment durations in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDurationRange")]
pub struct DurationRange {
    min_years: u32,
    max_years: u32,
}

#[derive(Deserialize)]
struct RawDurationRange {
    min_years: u32,
    max_years: u32,
}

impl DurationRange {
    /// Creates a validated range.
    ///
    /// # Errors
    /// Returns an error if `min_years` is zero or exceeds `max_years`, or if
    /// `max_years` in trading days overflows `u32`.
    pub fn new(min_years: u32, max_years: u32) -> Result<Self, ConfigurationError> {
        if min_years > max_years {
            return Err(ConfigurationError::InvertedDurationRange {
                min_years,
                max_years,
            });
        }
        if min_years == 0 {
            return Err(ConfigurationError::ZeroDuration);
        }
        if max_years.checked_mul(TRADING_DAYS_PER_YEAR).is_none() {
            return Err(ConfigurationError::DurationTooLong { max_years });
        }
        Ok(Self {
            min_years,
            max_years,
        })
    }

    /// A range holding a single duration.
    ///
    /// # Errors
    /// Returns an error if `years` is zero.
    pub fn exactly(years: u32) -> Result<Self, ConfigurationError> {
        Self::new(years, years)
    }

    #[must_use]
    pub fn min_years(&self) -> u32 {
        self.min_years
    }

    #[must_use]
    pub fn max_years(&self) -> u32 {
        self.max_years
    }

    /// Longest duration in trading days. Construction guarantees it fits.
    #[must_use]
    pub fn max_days(&self) -> u32 {
        years_to_days(self.max_years)
    }
}

impl TryFrom<RawDurationRange> for DurationRange {
    type Error = ConfigurationError;

    fn try_from(raw: RawDurationRange) -> Result<Self, Self::Error> {
        Self::new(raw.min_years, raw.max_years)
    }
}

/// Converts whole years to trading days, saturating at `u32::MAX`.
#[must_use]
pub fn years_to_days(years: u32) -> u32 {
    years.saturating_mul(TRADING_DAYS_PER_YEAR)
}

/// Whole-year bucket for a duration in trading days (rounded to nearest).
#[must_use]
pub fn days_to_years(days: u32) -> u32 {
    let rounds_up = days % TRADING_DAYS_PER_YEAR >= TRADING_DAYS_PER_YEAR / 2;
    days / TRADING_DAYS_PER_YEAR + u32::from(rounds_up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_range() {
        let err = DurationRange::new(10, 5).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvertedDurationRange {
                min_years: 10,
                max_years: 5
            }
        );
    }

    #[test]
    fn test_rejects_zero_years() {
        assert_eq!(
            DurationRange::new(0, 5).unwrap_err(),
            ConfigurationError::ZeroDuration
        );
    }

    #[test]
    fn test_rejects_overflowing_max_years() {
        assert_eq!(
            DurationRange::new(1, 20_000_000).unwrap_err(),
            ConfigurationError::DurationTooLong {
                max_years: 20_000_000
            }
        );
        let limit = u32::MAX / TRADING_DAYS_PER_YEAR;
        let range = DurationRange::new(1, limit).unwrap();
        assert_eq!(range.max_days(), limit * TRADING_DAYS_PER_YEAR);
        assert!(DurationRange::new(1, limit + 1).is_err());
        assert_eq!(years_to_days(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_day_conversions() {
        let range = DurationRange::new(1, 20).unwrap();
        assert_eq!(range.max_days(), 5040);
        assert_eq!(years_to_days(3), 756);
        assert_eq!(days_to_years(756), 3);
        assert_eq!(days_to_years(125), 0);
        assert_eq!(days_to_years(126), 1);
        assert_eq!(days_to_years(u32::MAX), u32::MAX / 252);
        assert_eq!(days_to_years(377), 1);
        assert_eq!(days_to_years(378), 2);
    }
}
