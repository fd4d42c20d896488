//! Strategy parameters.
//!
//! Parameters are validated once, when the struct is built, so the path
//! simulator never re-checks them.

use crate::error::ConfigurationError;
use crate::enums::{ContributionFrequency, FeeAccrual};
use serde::{Deserialize, Serialize};

/// Validated parameters of one investment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrategyParamsBuilder")]
pub struct StrategyParams {
    leverage: f64,
    annual_fee: f64,
    fee_accrual: FeeAccrual,
    initial_investment: f64,
    contribution_amount: f64,
    contribution_frequency: ContributionFrequency,
}

impl StrategyParams {
    /// Starts a builder with an unleveraged, fee-free, contribution-free
    /// strategy.
    #[must_use]
    pub fn builder() -> StrategyParamsBuilder {
        StrategyParamsBuilder::default()
    }

    /// Daily leverage multiplier.
    #[must_use]
    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Annual fee rate (0.0035 = 0.35%).
    #[must_use]
    pub fn annual_fee(&self) -> f64 {
        self.annual_fee
    }

    /// How the annual fee is spread over trading days.
    #[must_use]
    pub fn fee_accrual(&self) -> FeeAccrual {
        self.fee_accrual
    }

    /// Lump sum invested before the first trading day.
    #[must_use]
    pub fn initial_investment(&self) -> f64 {
        self.initial_investment
    }

    /// Amount added on each contribution day.
    #[must_use]
    pub fn contribution_amount(&self) -> f64 {
        self.contribution_amount
    }

    /// Contribution schedule.
    #[must_use]
    pub fn contribution_frequency(&self) -> ContributionFrequency {
        self.contribution_frequency
    }

    /// Contribution due on `day`, or zero.
    #[inline]
    #[must_use]
    pub fn contribution_on(&self, day: u32) -> f64 {
        if self.contribution_frequency.is_contribution_day(day) {
            self.contribution_amount
        } else {
            0.0
        }
    }

    /// Capital committed over a path of `days` trading days.
    #[must_use]
    pub fn total_contributed(&self, days: u32) -> f64 {
        self.initial_investment
            + self.contribution_amount * f64::from(self.contribution_frequency.contributions_in(days))
    }
}

/// Builder for [`StrategyParams`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParamsBuilder {
    leverage: f64,
    annual_fee: f64,
    fee_accrual: FeeAccrual,
    initial_investment: f64,
    contribution_amount: f64,
    contribution_frequency: ContributionFrequency,
}

impl Default for StrategyParamsBuilder {
    fn default() -> Self {
        Self {
            leverage: 1.0,
            annual_fee: 0.0,
            fee_accrual: FeeAccrual::Linear,
            initial_investment: 0.0,
            contribution_amount: 0.0,
            contribution_frequency: ContributionFrequency::None,
        }
    }
}

impl StrategyParamsBuilder {
    /// Sets the leverage multiplier.
    #[must_use]
    pub fn leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    /// Sets the annual fee rate.
    #[must_use]
    pub fn annual_fee(mut self, annual_fee: f64) -> Self {
        self.annual_fee = annual_fee;
        self
    }

    /// Sets the fee accrual method.
    #[must_use]
    pub fn fee_accrual(mut self, fee_accrual: FeeAccrual) -> Self {
        self.fee_accrual = fee_accrual;
        self
    }

    /// Sets the initial lump sum.
    #[must_use]
    pub fn initial_investment(mut self, amount: f64) -> Self {
        self.initial_investment = amount;
        self
    }

    /// Sets the periodic contribution.
    #[must_use]
    pub fn contribution(mut self, amount: f64, frequency: ContributionFrequency) -> Self {
        self.contribution_amount = amount;
        self.contribution_frequency = frequency;
        self
    }

    /// Validates and builds the parameters.
    ///
    /// # Errors
    /// Returns an error if any amount or rate is negative or not finite.
    pub fn build(self) -> Result<StrategyParams, ConfigurationError> {
        non_negative("leverage", self.leverage)?;
        non_negative("annual_fee", self.annual_fee)?;
        non_negative("initial_investment", self.initial_investment)?;
        non_negative("contribution_amount", self.contribution_amount)?;

        Ok(StrategyParams {
            leverage: self.leverage,
            annual_fee: self.annual_fee,
            fee_accrual: self.fee_accrual,
            initial_investment: self.initial_investment,
            contribution_amount: self.contribution_amount,
            contribution_frequency: self.contribution_frequency,
        })
    }
}

impl TryFrom<StrategyParamsBuilder> for StrategyParams {
    type Error = ConfigurationError;

    fn try_from(builder: StrategyParamsBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() {
        return Err(ConfigurationError::parameter(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(ConfigurationError::parameter(field, value, "must be >= 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = StrategyParams::builder().build().unwrap();
        assert_eq!(params.leverage(), 1.0);
        assert_eq!(params.annual_fee(), 0.0);
        assert_eq!(params.contribution_frequency(), ContributionFrequency::None);
        assert_eq!(params.total_contributed(252), 0.0);
    }

    #[test]
    fn test_builder_rejects_negative_leverage() {
        let err = StrategyParams::builder().leverage(-2.0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidParameter {
                field: "leverage",
                ..
            }
        ));
    }

    #[test]
    fn test_builder_rejects_non_finite_fee() {
        let err = StrategyParams::builder()
            .annual_fee(f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidParameter {
                field: "annual_fee",
                reason: "must be finite",
                ..
            }
        ));
    }

    #[test]
    fn test_total_contributed() {
        let params = StrategyParams::builder()
            .initial_investment(1000.0)
            .contribution(100.0, ContributionFrequency::Monthly)
            .build()
            .unwrap();
        assert_eq!(params.total_contributed(252), 1000.0 + 12.0 * 100.0);
        assert_eq!(params.contribution_on(21), 100.0);
        assert_eq!(params.contribution_on(22), 0.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let params: StrategyParams =
            serde_json::from_str(r#"{"leverage": 2.0, "annual_fee": 0.0035}"#).unwrap();
        assert_eq!(params.leverage(), 2.0);
        assert_eq!(params.fee_accrual(), FeeAccrual::Linear);

        let err = serde_json::from_str::<StrategyParams>(r#"{"contribution_amount": -5.0}"#);
        assert!(err.is_err());
    }
}
