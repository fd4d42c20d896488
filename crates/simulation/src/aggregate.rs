//! Distribution statistics over a simulation batch.
//!
//! Runs are bucketed by duration in whole years (`round(days / 252)`).
//! Percentiles use linear interpolation between closest ranks, see
//! [`levsim_domain::metrics::percentile`]. Aggregation is a pure function of
//! the batch: the same batch always yields bit-identical output.

use crate::monte_carlo::SimulationBatch;
use crate::path_simulator::SimulationRun;
use levsim_domain::metrics::{mean, percentile, sorted};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile ranks reported for terminal value and drawdown.
pub const DEFAULT_PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// One percentile of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePoint {
    /// Rank in `[0, 100]`.
    pub percentile: f64,
    /// Value at that rank.
    pub value: f64,
}

/// Percentiles of one distribution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentileTable {
    pub points: Vec<PercentilePoint>,
}

impl PercentileTable {
    /// Computes the given percentiles of `values`.
    #[must_use]
    pub fn from_values(values: &[f64], percentiles: &[f64]) -> Self {
        let values = sorted(values);
        let points = percentiles
            .iter()
            .filter_map(|&p| {
                percentile(&values, p).map(|value| PercentilePoint {
                    percentile: p,
                    value,
                })
            })
            .collect();
        Self { points }
    }

    /// Value at percentile `p`, if it was computed.
    #[must_use]
    pub fn get(&self, p: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.percentile == p)
            .map(|point| point.value)
    }
}

/// Location and range of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl SummaryStats {
    /// Summarizes `values`; `None` when empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let values = sorted(values);
        Some(Self {
            mean: mean(&values)?,
            median: percentile(&values, 50.0)?,
            min: *values.first()?,
            max: *values.last()?,
        })
    }
}

/// Statistics for all runs of one duration bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    /// Duration in whole years.
    pub years: u32,
    /// Runs in the bucket.
    pub count: usize,
    /// Terminal value percentiles.
    pub terminal_percentiles: PercentileTable,
    /// Terminal value summary.
    pub terminal: SummaryStats,
    /// Mean capital contributed.
    pub mean_contributed: f64,
    /// Mean fees paid.
    pub mean_fees: f64,
    /// Fraction of runs ending below capital contributed.
    pub probability_of_loss: f64,
    /// Fraction of runs with a positive total return.
    pub probability_of_gain: f64,
    /// Max drawdown percentiles.
    pub drawdown_percentiles: PercentileTable,
    /// Mean annualized return over runs where it is defined.
    pub mean_annualized_return: Option<f64>,
}

/// Probability of loss for one duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    /// Holding period bucket in whole years.
    pub years: u32,
    /// Share of runs in the bucket that lost money.
    pub probability_of_loss: f64,
}

/// Distribution summary of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Strategy the batch was run for.
    pub strategy: String,
    /// Ticker of the simulated index.
    pub ticker: String,
    /// Total runs aggregated.
    pub runs: usize,
    /// Per-duration statistics, ascending by years.
    pub buckets: Vec<BucketStats>,
    /// Terminal value summary over all runs.
    pub overall: Option<SummaryStats>,
    /// Probability of loss against duration.
    pub risk_curve: Vec<RiskPoint>,
}

impl AggregateResult {
    /// Statistics for a duration bucket.
    #[must_use]
    pub fn bucket(&self, years: u32) -> Option<&BucketStats> {
        self.buckets.iter().find(|b| b.years == years)
    }
}

/// Aggregates a batch with the default percentiles.
#[must_use]
pub fn aggregate(batch: &SimulationBatch) -> AggregateResult {
    aggregate_with(batch, &DEFAULT_PERCENTILES)
}

/// Aggregates a batch with custom percentile ranks.
#[must_use]
pub fn aggregate_with(batch: &SimulationBatch, percentiles: &[f64]) -> AggregateResult {
    let mut by_years: BTreeMap<u32, Vec<&SimulationRun>> = BTreeMap::new();
    for run in &batch.runs {
        by_years.entry(run.duration_years()).or_default().push(run);
    }

    let buckets: Vec<BucketStats> = by_years
        .into_iter()
        .filter_map(|(years, runs)| bucket_stats(years, &runs, percentiles))
        .collect();

    let risk_curve = buckets
        .iter()
        .map(|b| RiskPoint {
            years: b.years,
            probability_of_loss: b.probability_of_loss,
        })
        .collect();

    let terminals: Vec<f64> = batch.runs.iter().map(|r| r.terminal_value).collect();

    AggregateResult {
        strategy: batch.strategy.clone(),
        ticker: batch.ticker.clone(),
        runs: batch.runs.len(),
        buckets,
        overall: SummaryStats::from_values(&terminals),
        risk_curve,
    }
}

fn bucket_stats(years: u32, runs: &[&SimulationRun], percentiles: &[f64]) -> Option<BucketStats> {
    let terminals: Vec<f64> = runs.iter().map(|r| r.terminal_value).collect();
    let drawdowns: Vec<f64> = runs.iter().map(|r| r.max_drawdown).collect();
    let contributed: Vec<f64> = runs.iter().map(|r| r.total_contributed).collect();
    let fees: Vec<f64> = runs.iter().map(|r| r.total_fees).collect();
    let annualized: Vec<f64> = runs.iter().filter_map(|r| r.annualized_return).collect();

    let count = runs.len();
    let losses = runs.iter().filter(|r| r.is_loss()).count();
    let gains = runs.iter().filter(|r| r.is_gain()).count();

    Some(BucketStats {
        years,
        count,
        terminal_percentiles: PercentileTable::from_values(&terminals, percentiles),
        terminal: SummaryStats::from_values(&terminals)?,
        mean_contributed: mean(&contributed)?,
        mean_fees: mean(&fees)?,
        probability_of_loss: losses as f64 / count as f64,
        probability_of_gain: gains as f64 / count as f64,
        drawdown_percentiles: PercentileTable::from_values(&drawdowns, percentiles),
        mean_annualized_return: mean(&annualized),
    })
}

/// Per-day percentile bands across retained trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryBands {
    /// Number of trajectories contributing to each day.
    pub paths: usize,
    /// For each percentile, the band value on each day.
    pub bands: Vec<(f64, Vec<f64>)>,
}

/// Computes per-day percentile bands over the retained trajectories.
///
/// All trajectories are truncated to the shortest one. Returns `None` when
/// the batch kept no trajectories.
#[must_use]
pub fn trajectory_bands(batch: &SimulationBatch, percentiles: &[f64]) -> Option<TrajectoryBands> {
    let trajectories: Vec<&Vec<f64>> = batch
        .runs
        .iter()
        .filter_map(|r| r.trajectory.as_ref())
        .collect();
    let days = trajectories.iter().map(|t| t.len()).min()?;

    let mut bands: Vec<(f64, Vec<f64>)> = percentiles
        .iter()
        .map(|&p| (p, Vec::with_capacity(days)))
        .collect();
    let mut column = Vec::with_capacity(trajectories.len());
    for day in 0..days {
        column.clear();
        column.extend(trajectories.iter().map(|t| t[day]));
        column.sort_by(f64::total_cmp);
        for (p, band) in &mut bands {
            if let Some(value) = percentile(&column, *p) {
                band.push(value);
            }
        }
    }

    Some(TrajectoryBands {
        paths: trajectories.len(),
        bands,
    })
}

/// One row of the cross-strategy summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub years: u32,
    pub strategy: String,
    pub mean_end_value: f64,
    pub median_end_value: f64,
    pub min_end_value: f64,
    pub max_end_value: f64,
    pub mean_invested: f64,
    pub mean_fee: f64,
    /// Percentage of runs with a positive total return.
    pub positive_return_pct: f64,
    /// Percentage of runs ending below capital contributed.
    pub loss_probability_pct: f64,
}

/// Flattens several strategies' results into rows ordered by duration, then
/// by the order the strategies were given.
#[must_use]
pub fn summary_table(results: &[AggregateResult]) -> Vec<SummaryRow> {
    let mut rows: Vec<(u32, usize, SummaryRow)> = results
        .iter()
        .enumerate()
        .flat_map(|(order, result)| {
            result.buckets.iter().map(move |b| {
                (
                    b.years,
                    order,
                    SummaryRow {
                        years: b.years,
                        strategy: result.strategy.clone(),
                        mean_end_value: b.terminal.mean,
                        median_end_value: b.terminal.median,
                        min_end_value: b.terminal.min,
                        max_end_value: b.terminal.max,
                        mean_invested: b.mean_contributed,
                        mean_fee: b.mean_fees,
                        positive_return_pct: b.probability_of_gain * 100.0,
                        loss_probability_pct: b.probability_of_loss * 100.0,
                    },
                )
            })
        })
        .collect();
    rows.sort_by_key(|(years, order, _)| (*years, *order));
    rows.into_iter().map(|(_, _, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::{BatchConfig, run_batch};
    use chrono::NaiveDate;
    use levsim_domain::entities::{ReturnSeries, StrategyParams};
    use levsim_domain::enums::ContributionFrequency;
    use levsim_domain::value_objects::{DurationRange, SampleWindow};
    use uuid::Uuid;

    fn run(days: u32, terminal: f64, contributed: f64, drawdown: f64) -> SimulationRun {
        SimulationRun {
            run_index: 0,
            duration_days: days,
            window: SampleWindow::contiguous(0, days as usize),
            total_contributed: contributed,
            terminal_value: terminal,
            total_fees: 1.0,
            max_drawdown: drawdown,
            total_return: Some(terminal / contributed - 1.0),
            annualized_return: None,
            trajectory: None,
        }
    }

    fn batch(runs: Vec<SimulationRun>) -> SimulationBatch {
        SimulationBatch {
            id: Uuid::nil(),
            strategy: "S&P 500".to_string(),
            ticker: "^GSPC".to_string(),
            params: StrategyParams::builder().build().unwrap(),
            config: BatchConfig::new(runs.len().max(1), DurationRange::new(1, 2).unwrap(), 0),
            runs,
        }
    }

    fn series() -> ReturnSeries {
        let returns = (0..3000)
            .map(|i| 1.0 + (((i * 13) % 9) as f64 - 4.0) / 300.0)
            .collect();
        ReturnSeries::new("^GSPC", NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(), returns).unwrap()
    }

    #[test]
    fn test_bucket_median_interpolates() {
        let runs = [100.0, 200.0, 300.0, 400.0]
            .into_iter()
            .map(|t| run(252, t, 250.0, 0.1))
            .collect();
        let result = aggregate(&batch(runs));

        let bucket = result.bucket(1).unwrap();
        assert_eq!(bucket.count, 4);
        assert_eq!(bucket.terminal_percentiles.get(50.0), Some(250.0));
        assert_eq!(bucket.terminal.median, 250.0);
        assert_eq!(bucket.terminal.mean, 250.0);
        assert_eq!(bucket.terminal.min, 100.0);
        assert_eq!(bucket.terminal.max, 400.0);
        assert_eq!(bucket.probability_of_loss, 0.5);
        assert_eq!(bucket.probability_of_gain, 0.5);
    }

    #[test]
    fn test_single_sample_bucket() {
        let result = aggregate(&batch(vec![run(504, 120.0, 100.0, 0.3)]));
        let bucket = result.bucket(2).unwrap();
        assert_eq!(bucket.count, 1);
        for p in DEFAULT_PERCENTILES {
            assert_eq!(bucket.terminal_percentiles.get(p), Some(120.0));
            assert_eq!(bucket.drawdown_percentiles.get(p), Some(0.3));
        }
        assert_eq!(result.risk_curve, vec![RiskPoint {
            years: 2,
            probability_of_loss: 0.0
        }]);
    }

    #[test]
    fn test_buckets_sorted_and_grouped() {
        let runs = vec![
            run(756, 1.0, 2.0, 0.0),
            run(252, 3.0, 2.0, 0.0),
            run(750, 1.0, 2.0, 0.0),
        ];
        let result = aggregate(&batch(runs));
        let years: Vec<u32> = result.buckets.iter().map(|b| b.years).collect();
        assert_eq!(years, vec![1, 3]);
        assert_eq!(result.bucket(3).unwrap().count, 2);
        assert_eq!(result.bucket(3).unwrap().probability_of_loss, 1.0);
        assert_eq!(result.runs, 3);
    }

    #[test]
    fn test_empty_batch() {
        let result = aggregate(&batch(vec![]));
        assert!(result.buckets.is_empty());
        assert!(result.overall.is_none());
    }

    #[test]
    fn test_aggregate_is_reproducible() {
        let params = StrategyParams::builder()
            .leverage(2.0)
            .annual_fee(0.0035)
            .contribution(39.68, ContributionFrequency::Daily)
            .build()
            .unwrap();
        let a = aggregate(&run_batch(&series(), 400, 1, 10, params, 2024).unwrap());
        let b = aggregate(&run_batch(&series(), 400, 1, 10, params, 2024).unwrap());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_trajectory_bands() {
        let mut a = run(2, 3.0, 1.0, 0.0);
        a.trajectory = Some(vec![1.0, 2.0, 3.0]);
        let mut b = run(1, 1.0, 1.0, 0.0);
        b.trajectory = Some(vec![1.0, 4.0]);
        let bands = trajectory_bands(&batch(vec![a, b]), &[0.0, 50.0, 100.0]).unwrap();

        assert_eq!(bands.paths, 2);
        assert_eq!(bands.bands[0], (0.0, vec![1.0, 2.0]));
        assert_eq!(bands.bands[1], (50.0, vec![1.0, 3.0]));
        assert_eq!(bands.bands[2], (100.0, vec![1.0, 4.0]));

        assert!(trajectory_bands(&batch(vec![run(1, 1.0, 1.0, 0.0)]), &[50.0]).is_none());
    }

    #[test]
    fn test_summary_table_orders_by_duration_then_strategy() {
        let mut lev = batch(vec![run(252, 1.0, 1.0, 0.0), run(504, 1.0, 1.0, 0.0)]);
        lev.strategy = "Leveraged S&P 500".to_string();
        let plain = batch(vec![run(504, 2.0, 1.0, 0.0), run(252, 2.0, 1.0, 0.0)]);

        let rows = summary_table(&[aggregate(&plain), aggregate(&lev)]);
        let keys: Vec<(u32, &str)> = rows.iter().map(|r| (r.years, r.strategy.as_str())).collect();
        assert_eq!(keys, vec![
            (1, "S&P 500"),
            (1, "Leveraged S&P 500"),
            (2, "S&P 500"),
            (2, "Leveraged S&P 500"),
        ]);
        assert_eq!(rows[0].positive_return_pct, 100.0);
        assert_eq!(rows[1].positive_return_pct, 0.0);
    }
}
