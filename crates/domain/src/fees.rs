//! Leverage and fee model.
//!
//! A leveraged fund resets its exposure every day, so leverage multiplies the
//! day's percentage move rather than the cumulative return. The annual
//! management fee is pro-rated per trading day and deducted from the day's
//! growth factor.

use crate::TRADING_DAYS_PER_YEAR;
use crate::entities::strategy::StrategyParams;
use crate::enums::FeeAccrual;
use serde::{Deserialize, Serialize};

/// Returns the fee deducted from each day's growth factor.
#[must_use]
pub fn daily_fee_rate(annual_fee: f64, accrual: FeeAccrual) -> f64 {
    let days = f64::from(TRADING_DAYS_PER_YEAR);
    match accrual {
        FeeAccrual::Linear => annual_fee / days,
        FeeAccrual::Geometric => (1.0 + annual_fee).powf(1.0 / days) - 1.0,
    }
}

/// Maps a day's unleveraged return ratio to the leveraged fund's ratio.
///
/// Computes `1 + leverage * (raw_return - 1) - annual_fee / 252`.
///
/// # Arguments
///
/// * `raw_return` - The index's return ratio for the day (1.012 = +1.2%)
/// * `leverage` - Daily leverage multiplier
/// * `annual_fee` - Annual fee rate (0.0035 = 0.35%)
#[must_use]
pub fn effective_daily_return(raw_return: f64, leverage: f64, annual_fee: f64) -> f64 {
    apply_leverage(
        raw_return,
        leverage,
        daily_fee_rate(annual_fee, FeeAccrual::Linear),
    )
}

/// Applies leverage around the 1.0 baseline and deducts a daily fee.
#[must_use]
pub fn apply_leverage(raw_return: f64, leverage: f64, daily_fee: f64) -> f64 {
    // Exact for the unleveraged case; `1 + (r - 1)` can round when r > 2.
    let leveraged = if leverage == 1.0 {
        raw_return
    } else {
        1.0 + leverage * (raw_return - 1.0)
    };
    leveraged - daily_fee
}

/// Leverage and daily fee resolved once per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturnModel {
    /// Daily leverage multiplier.
    pub leverage: f64,
    /// Fee deducted from each day's growth factor.
    pub daily_fee: f64,
}

impl DailyReturnModel {
    /// Creates a model from a leverage multiplier and an annual fee.
    #[must_use]
    pub fn new(leverage: f64, annual_fee: f64, accrual: FeeAccrual) -> Self {
        Self {
            leverage,
            daily_fee: daily_fee_rate(annual_fee, accrual),
        }
    }

    /// Creates the model described by a strategy.
    #[must_use]
    pub fn from_params(params: &StrategyParams) -> Self {
        Self::new(params.leverage(), params.annual_fee(), params.fee_accrual())
    }

    /// Effective growth factor for a day with the given raw return.
    #[inline]
    #[must_use]
    pub fn apply(&self, raw_return: f64) -> f64 {
        apply_leverage(raw_return, self.leverage, self.daily_fee)
    }
}
