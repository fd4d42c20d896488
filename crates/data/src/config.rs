//! Strategy book: the strategies to simulate for one index.
//!
//! ```json
//! {
//!   "index": "^GSPC",
//!   "start_date": "1930-01-01",
//!   "strategies": [
//!     { "name": "S&P 500", "leverage": 1.0, "annual_fee": 0.0025,
//!       "contribution_amount": 39.68, "contribution_frequency": "daily" }
//!   ]
//! }
//! ```

use crate::error::DataError;
use chrono::NaiveDate;
use levsim_domain::entities::StrategyParams;
use levsim_domain::enums::{ContributionFrequency, FeeAccrual};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Monthly amount invested by the default strategies.
pub const DEFAULT_MONTHLY_INVESTMENT: f64 = 833.33;
/// Trading days a monthly amount is spread over.
pub const TRADING_DAYS_PER_MONTH: f64 = 21.0;

/// A named strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub name: String,
    #[serde(flatten)]
    pub params: StrategyParams,
}

/// Strategies to simulate for one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyBook {
    /// Index identifier.
    pub index: String,
    /// History before this date is ignored.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub strategies: Vec<StrategyDefinition>,
}

impl StrategyBook {
    /// Reads and validates a book from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or the book is
    /// invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let book = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            index = %book.index,
            strategies = book.strategies.len(),
            "Loaded strategy book"
        );
        Ok(book)
    }

    /// Parses and validates a book.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, a strategy's parameters are
    /// out of bounds, the book is empty, or two strategies share a name.
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        let book: Self = serde_json::from_str(text)?;
        book.validate()?;
        Ok(book)
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.strategies.is_empty() {
            return Err(DataError::InvalidBook("no strategies defined".to_string()));
        }
        let mut names = HashSet::new();
        for strategy in &self.strategies {
            if !names.insert(strategy.name.as_str()) {
                return Err(DataError::InvalidBook(format!(
                    "duplicate strategy name '{}'",
                    strategy.name
                )));
            }
        }
        Ok(())
    }

    /// The standard S&P 500 comparison: an unleveraged fund at 0.25% and a
    /// 2x fund at 0.35%, each receiving the monthly investment spread over
    /// every trading day.
    ///
    /// # Errors
    /// Never fails for the built-in values; the result type mirrors
    /// parameter validation.
    pub fn sp500_default() -> Result<Self, DataError> {
        let daily = DEFAULT_MONTHLY_INVESTMENT / TRADING_DAYS_PER_MONTH;
        let strategy = |name: &str, leverage: f64, annual_fee: f64| {
            StrategyParams::builder()
                .leverage(leverage)
                .annual_fee(annual_fee)
                .fee_accrual(FeeAccrual::Geometric)
                .contribution(daily, ContributionFrequency::Daily)
                .build()
                .map(|params| StrategyDefinition {
                    name: name.to_string(),
                    params,
                })
        };

        Ok(Self {
            index: "^GSPC".to_string(),
            start_date: NaiveDate::from_ymd_opt(1930, 1, 1),
            strategies: vec![
                strategy("S&P 500", 1.0, 0.0025)?,
                strategy("Leveraged S&P 500", 2.0, 0.0035)?,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book() {
        let book = StrategyBook::from_json(
            r#"{
                "index": "^NDX",
                "start_date": "1985-10-01",
                "strategies": [
                    {"name": "Nasdaq", "annual_fee": 0.002},
                    {"name": "3x Nasdaq", "leverage": 3.0, "annual_fee": 0.0095,
                     "fee_accrual": "geometric", "initial_investment": 10000.0,
                     "contribution_amount": 500.0, "contribution_frequency": "monthly"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(book.index, "^NDX");
        assert_eq!(book.start_date, NaiveDate::from_ymd_opt(1985, 10, 1));
        assert_eq!(book.strategies[0].params.leverage(), 1.0);
        let triple = &book.strategies[1].params;
        assert_eq!(triple.leverage(), 3.0);
        assert_eq!(triple.fee_accrual(), FeeAccrual::Geometric);
        assert_eq!(triple.contribution_frequency(), ContributionFrequency::Monthly);
        assert_eq!(triple.initial_investment(), 10_000.0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let err = StrategyBook::from_json(
            r#"{"index": "X", "strategies": [{"name": "bad", "leverage": -1.0}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Json(_)));
    }

    #[test]
    fn test_rejects_empty_and_duplicate() {
        let err = StrategyBook::from_json(r#"{"index": "X", "strategies": []}"#).unwrap_err();
        assert!(matches!(err, DataError::InvalidBook(_)));

        let err = StrategyBook::from_json(
            r#"{"index": "X", "strategies": [{"name": "a"}, {"name": "a"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::InvalidBook(_)));
    }

    #[test]
    fn test_default_book() {
        let book = StrategyBook::sp500_default().unwrap();
        assert_eq!(book.strategies.len(), 2);
        assert_eq!(book.strategies[1].params.leverage(), 2.0);
        let daily = book.strategies[0].params.contribution_amount();
        assert!((daily * 21.0 - DEFAULT_MONTHLY_INVESTMENT).abs() < 1e-9);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        let book = StrategyBook::sp500_default().unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&book).unwrap()).unwrap();

        let loaded = StrategyBook::load(&path).unwrap();
        assert_eq!(loaded.index, book.index);
        assert_eq!(loaded.start_date, book.start_date);
        let names: Vec<&str> = loaded.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S&P 500", "Leveraged S&P 500"]);
        assert_eq!(loaded.strategies[1].params.annual_fee(), 0.0035);
    }
}
