//! Monte Carlo batch driver.
//!
//! Runs are independent: each reads the shared series and strategy and owns
//! its own RNG, seeded from the batch seed and the run index. Runs execute on
//! the rayon pool and are collected in run-index order once all complete, so
//! a batch is bit-reproducible regardless of thread count or scheduling.

use crate::cancel::CancellationFlag;
use crate::error::SimulationError;
use crate::path_simulator::{PathSimulator, SimulationRun};
use levsim_domain::ConfigurationError;
use levsim_domain::entities::{ReturnSeries, StrategyParams};
use levsim_domain::enums::SamplingPolicy;
use levsim_domain::value_objects::DurationRange;
use levsim_domain::value_objects::duration_range::years_to_days;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of simulated paths.
    pub n_simulations: usize,
    /// Range from which each path's duration is drawn.
    pub durations: DurationRange,
    /// Batch seed.
    pub seed: u64,
    /// Window sampling policy.
    pub sampling: SamplingPolicy,
    /// Keep full wealth trajectories on every run.
    pub retain_trajectories: bool,
}

impl BatchConfig {
    /// Creates a config with cyclic sampling and no retained trajectories.
    #[must_use]
    pub fn new(n_simulations: usize, durations: DurationRange, seed: u64) -> Self {
        Self {
            n_simulations,
            durations,
            seed,
            sampling: SamplingPolicy::Cyclic,
            retain_trajectories: false,
        }
    }

    /// Sets the sampling policy.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets whether trajectories are retained.
    #[must_use]
    pub fn with_trajectories(mut self, retain: bool) -> Self {
        self.retain_trajectories = retain;
        self
    }

    /// Checks the config.
    ///
    /// # Errors
    /// Returns an error if no simulations are requested.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_simulations == 0 {
            return Err(ConfigurationError::NoSimulations);
        }
        Ok(())
    }
}

/// Raw outcomes of a completed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBatch {
    /// Batch identifier.
    pub id: Uuid,
    /// Strategy label.
    pub strategy: String,
    /// Index the series belongs to.
    pub ticker: String,
    /// Strategy parameters used by every run.
    pub params: StrategyParams,
    /// Batch configuration.
    pub config: BatchConfig,
    /// Runs in run-index order.
    pub runs: Vec<SimulationRun>,
}

/// Callback invoked with the number of completed runs after each run.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Runs a batch of simulations for one strategy.
pub struct MonteCarloRunner<'a> {
    pub series: &'a ReturnSeries,
    pub params: StrategyParams,
    pub config: BatchConfig,
    /// Strategy name stamped on the batch.
    pub strategy: String,
    /// Checked before each run.
    pub cancel: CancellationFlag,
    /// Called from worker threads; must be cheap.
    pub on_progress: Option<ProgressFn>,
}

impl<'a> MonteCarloRunner<'a> {
    #[must_use]
    pub fn new(
        series: &'a ReturnSeries,
        strategy: impl Into<String>,
        params: StrategyParams,
        config: BatchConfig,
    ) -> Self {
        Self {
            series,
            params,
            config,
            strategy: strategy.into(),
            cancel: CancellationFlag::new(),
            on_progress: None,
        }
    }

    /// Uses an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reports progress after every completed run.
    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Runs every simulation and returns the finished batch.
    ///
    /// # Errors
    /// Returns [`SimulationError::Configuration`] before any run starts if
    /// the inputs are invalid, and [`SimulationError::Cancelled`] if the
    /// cancellation flag is raised mid-batch.
    pub fn run(&self) -> Result<SimulationBatch, SimulationError> {
        self.config.validate()?;
        if self.series.is_empty() {
            return Err(ConfigurationError::EmptySeries {
                ticker: self.series.ticker().to_string(),
            }
            .into());
        }

        let simulator = PathSimulator::new(self.series, self.params, self.config.sampling)?
            .retain_trajectory(self.config.retain_trajectories);
        let durations = self.config.durations;
        let seed = self.config.seed;

        info!(
            strategy = %self.strategy,
            ticker = self.series.ticker(),
            n_simulations = self.config.n_simulations,
            min_years = durations.min_years(),
            max_years = durations.max_years(),
            sampler = simulator.sampler_name(),
            seed,
            "Starting batch"
        );
        if durations.max_days() as usize > self.series.len() {
            debug!(
                series_days = self.series.len(),
                max_days = durations.max_days(),
                "Longest duration exceeds series; windows will wrap"
            );
        }
        let started = Instant::now();
        let completed = AtomicUsize::new(0);

        let runs: Option<Vec<SimulationRun>> = (0..self.config.n_simulations)
            .into_par_iter()
            .map(|run_index| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let mut rng = StdRng::seed_from_u64(derive_run_seed(seed, run_index as u64));
                let years = rng.random_range(durations.min_years()..=durations.max_years());
                let run = simulator.simulate(run_index, years_to_days(years), &mut rng);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(on_progress) = &self.on_progress {
                    on_progress(done);
                }
                Some(run)
            })
            .collect();

        let Some(runs) = runs else {
            let completed = completed.load(Ordering::Relaxed);
            warn!(
                strategy = %self.strategy,
                completed,
                "Batch cancelled, discarding partial results"
            );
            return Err(SimulationError::Cancelled { completed });
        };

        let series_len = self.series.len();
        info!(
            strategy = %self.strategy,
            runs = runs.len(),
            wrapped = runs.iter().filter(|r| r.window.wraps(series_len)).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );

        Ok(SimulationBatch {
            id: Uuid::new_v4(),
            strategy: self.strategy.clone(),
            ticker: self.series.ticker().to_string(),
            params: self.params,
            config: self.config.clone(),
            runs,
        })
    }
}

/// Runs a batch with cyclic sampling and no retained trajectories.
///
/// # Errors
/// Returns a configuration error if `n_simulations` is zero, the duration
/// range is invalid, or the series is empty.
pub fn run_batch(
    return_series: &ReturnSeries,
    n_simulations: usize,
    min_years: u32,
    max_years: u32,
    strategy_params: StrategyParams,
    seed: u64,
) -> Result<SimulationBatch, SimulationError> {
    if n_simulations == 0 {
        return Err(ConfigurationError::NoSimulations.into());
    }
    let durations = DurationRange::new(min_years, max_years)?;
    let config = BatchConfig::new(n_simulations, durations, seed);
    MonteCarloRunner::new(return_series, "strategy", strategy_params, config).run()
}

/// Derives the seed of one run from the batch seed (SplitMix64 finalizer).
#[must_use]
pub fn derive_run_seed(batch_seed: u64, run_index: u64) -> u64 {
    let mut z = batch_seed.wrapping_add(run_index.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
