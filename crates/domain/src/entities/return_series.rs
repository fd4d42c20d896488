//! Historical daily return series.

use crate::TRADING_DAYS_PER_YEAR;
use crate::error::ConfigurationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Chronologically ordered daily return ratios for one index.
///
/// A ratio of 1.012 is a +1.2% day. Gaps and holidays are resolved by the
/// loader; the series length is the sampling universe. The series is
/// immutable once built and shared read-only by every run of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReturnSeries")]
pub struct ReturnSeries {
    ticker: String,
    start_date: NaiveDate,
    returns: Vec<f64>,
}

#[derive(Deserialize)]
struct RawReturnSeries {
    ticker: String,
    start_date: NaiveDate,
    returns: Vec<f64>,
}

impl TryFrom<RawReturnSeries> for ReturnSeries {
    type Error = ConfigurationError;

    fn try_from(raw: RawReturnSeries) -> Result<Self, Self::Error> {
        Self::new(raw.ticker, raw.start_date, raw.returns)
    }
}

impl ReturnSeries {
    /// Creates a series from return ratios.
    ///
    /// # Errors
    /// Returns an error if the series is empty or holds a ratio that is not
    /// finite and strictly positive.
    pub fn new(
        ticker: impl Into<String>,
        start_date: NaiveDate,
        returns: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        let ticker = ticker.into();
        if returns.is_empty() {
            return Err(ConfigurationError::EmptySeries { ticker });
        }
        if let Some((index, &value)) = returns
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r <= 0.0)
        {
            return Err(ConfigurationError::InvalidReturn {
                ticker,
                index,
                value,
            });
        }
        Ok(Self {
            ticker,
            start_date,
            returns,
        })
    }

    /// Creates a series from consecutive closing prices.
    ///
    /// Each ratio is `price[i] / price[i - 1]`, so `n` prices yield `n - 1`
    /// returns. `start_date` is the date of the first price.
    ///
    /// # Errors
    /// Returns an error if fewer than two prices are supplied or a price is
    /// not finite and strictly positive.
    pub fn from_prices(
        ticker: impl Into<String>,
        start_date: NaiveDate,
        prices: &[f64],
    ) -> Result<Self, ConfigurationError> {
        let ticker = ticker.into();
        if let Some((index, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(ConfigurationError::InvalidReturn {
                ticker,
                index,
                value,
            });
        }
        let returns = prices.windows(2).map(|w| w[1] / w[0]).collect();
        Self::new(ticker, start_date, returns)
    }

    /// Index identifier.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Date of the first observation.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// All return ratios.
    #[must_use]
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Number of daily returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Always false: construction rejects empty series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Length of the series in years of trading days.
    #[must_use]
    pub fn years(&self) -> f64 {
        self.returns.len() as f64 / f64::from(TRADING_DAYS_PER_YEAR)
    }
}
