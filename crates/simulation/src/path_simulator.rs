//! Single-path simulator.
//!
//! A path walks a window of historical returns one trading day at a time.
//! On each contribution day the contribution is added before that day's
//! return is applied; the whole portfolio is then multiplied by the
//! leveraged, fee-adjusted growth factor.

use crate::sampler::{CyclicWindow, WindowSampler, sampler_for};
use levsim_domain::ConfigurationError;
use levsim_domain::entities::{ReturnSeries, StrategyParams};
use levsim_domain::enums::SamplingPolicy;
use levsim_domain::fees::DailyReturnModel;
use levsim_domain::metrics::{DrawdownTracker, annualized_return, total_return};
use levsim_domain::value_objects::SampleWindow;
use levsim_domain::value_objects::duration_range::days_to_years;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Outcome of one simulated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Position of the run within its batch.
    pub run_index: usize,
    /// Trading days of compounding applied.
    pub duration_days: u32,
    /// Returns used, as a reference into the series.
    pub window: SampleWindow,
    /// Initial investment plus all contributions.
    pub total_contributed: f64,
    /// Portfolio value after the last day.
    pub terminal_value: f64,
    /// Fees deducted over the path.
    pub total_fees: f64,
    /// Largest peak-to-trough decline as a fraction of the peak.
    pub max_drawdown: f64,
    /// `terminal / contributed - 1`.
    pub total_return: Option<f64>,
    /// CAGR-equivalent return.
    pub annualized_return: Option<f64>,
    /// Portfolio value before day 0 and after each day, when retained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Vec<f64>>,
}

impl SimulationRun {
    /// Duration bucket in whole years.
    #[must_use]
    pub fn duration_years(&self) -> u32 {
        days_to_years(self.duration_days)
    }

    /// Whether the path ended below the capital put in.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.terminal_value < self.total_contributed
    }

    /// Whether the path ended with a positive total return.
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.total_return.is_some_and(|r| r > 0.0)
    }
}

/// Simulates paths for one strategy over one series.
pub struct PathSimulator<'a> {
    series: &'a ReturnSeries,
    params: StrategyParams,
    model: DailyReturnModel,
    sampler: Box<dyn WindowSampler>,
    retain_trajectory: bool,
}

impl<'a> PathSimulator<'a> {
    /// Creates a simulator.
    ///
    /// # Errors
    /// Returns an error if the sampling policy is invalid.
    pub fn new(
        series: &'a ReturnSeries,
        params: StrategyParams,
        policy: SamplingPolicy,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            series,
            params,
            model: DailyReturnModel::from_params(&params),
            sampler: sampler_for(policy)?,
            retain_trajectory: false,
        })
    }

    /// Keeps the full wealth trajectory on every run.
    #[must_use]
    pub fn retain_trajectory(mut self, retain: bool) -> Self {
        self.retain_trajectory = retain;
        self
    }

    /// Name of the window sampler in use.
    #[must_use]
    pub fn sampler_name(&self) -> &'static str {
        self.sampler.name()
    }

    /// Draws a window of `duration_days` returns and walks it.
    pub fn simulate(
        &self,
        run_index: usize,
        duration_days: u32,
        rng: &mut dyn RngCore,
    ) -> SimulationRun {
        let window = self
            .sampler
            .sample(self.series.len(), duration_days as usize, rng);
        self.simulate_window(run_index, window)
    }

    /// Walks an explicit window.
    #[must_use]
    pub fn simulate_window(&self, run_index: usize, window: SampleWindow) -> SimulationRun {
        walk(
            self.series,
            &self.params,
            &self.model,
            window,
            self.retain_trajectory,
            run_index,
        )
    }
}

/// Simulates one path with a contiguous, cyclically wrapping window.
///
/// The trajectory is not retained; use [`PathSimulator`] to keep it or to
/// choose another sampling policy.
pub fn simulate_path<R: RngCore>(
    return_series: &ReturnSeries,
    duration_days: u32,
    strategy_params: &StrategyParams,
    rng: &mut R,
) -> SimulationRun {
    let window = CyclicWindow.sample(return_series.len(), duration_days as usize, rng);
    let model = DailyReturnModel::from_params(strategy_params);
    walk(return_series, strategy_params, &model, window, false, 0)
}

fn walk(
    series: &ReturnSeries,
    params: &StrategyParams,
    model: &DailyReturnModel,
    window: SampleWindow,
    retain_trajectory: bool,
    run_index: usize,
) -> SimulationRun {
    let days = window.len();
    let returns = series.returns();

    let mut value = params.initial_investment();
    let mut fees = 0.0;
    let mut drawdown = DrawdownTracker::new(value);
    let mut trajectory = retain_trajectory.then(|| {
        let mut t = Vec::with_capacity(days + 1);
        t.push(value);
        t
    });

    for (day, index) in window.indices(returns.len()).enumerate() {
        value += params.contribution_on(day as u32);

        fees += value * model.daily_fee;
        value *= model.apply(returns[index]);
        drawdown.update(value);

        if let Some(t) = trajectory.as_mut() {
            t.push(value);
        }
    }

    let duration_days = days as u32;
    let contributed = params.total_contributed(duration_days);
    SimulationRun {
        run_index,
        duration_days,
        window,
        total_contributed: contributed,
        terminal_value: value,
        total_fees: fees,
        max_drawdown: drawdown.max_drawdown(),
        total_return: total_return(value, contributed),
        annualized_return: annualized_return(value, contributed, duration_days),
        trajectory,
    }
}
