use crate::TRADING_DAYS_PER_YEAR;
use serde::{Deserialize, Serialize};

/// How often a fixed contribution is added to the portfolio.
///
/// Periods are counted in trading days: a week is 5 days, a month 21, a
/// quarter 63 and a year 252. The contribution lands on every day index that
/// is a multiple of the period, starting with day 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionFrequency {
    /// No periodic contributions.
    None,
    /// Every trading day.
    #[default]
    Daily,
    /// Every 5 trading days.
    Weekly,
    /// Every 21 trading days.
    Monthly,
    /// Every 63 trading days.
    Quarterly,
    /// Every 252 trading days.
    Annually,
}

impl ContributionFrequency {
    /// Returns the contribution period in trading days, or `None` when no
    /// contributions are made.
    #[must_use]
    pub fn period_days(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Daily => Some(1),
            Self::Weekly => Some(5),
            Self::Monthly => Some(21),
            Self::Quarterly => Some(63),
            Self::Annually => Some(TRADING_DAYS_PER_YEAR),
        }
    }

    /// Whether a contribution is due on the given day index.
    #[must_use]
    pub fn is_contribution_day(self, day: u32) -> bool {
        self.period_days().is_some_and(|period| day % period == 0)
    }

    /// Number of contributions paid over a path of `days` trading days.
    #[must_use]
    pub fn contributions_in(self, days: u32) -> u32 {
        match self.period_days() {
            Some(period) if days > 0 => (days - 1) / period + 1,
            _ => 0,
        }
    }
}

/// How an annual fee is spread over trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeAccrual {
    /// `annual_fee / 252` per day.
    #[default]
    Linear,
    /// `(1 + annual_fee)^(1/252) - 1` per day, compounding to exactly the
    /// annual fee over a year.
    Geometric,
}

/// How a window of historical returns is drawn for one path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// One contiguous window at a uniform start. Durations longer than the
    /// series wrap around to its beginning.
    #[default]
    Cyclic,
    /// Stationary bootstrap: contiguous blocks with geometrically distributed
    /// lengths, each at a uniform start, wrapping cyclically.
    StationaryBootstrap {
        /// Expected block length in trading days.
        mean_block_days: u32,
    },
}
