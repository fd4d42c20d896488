//! Local persistence of simulation results.
//!
//! One output directory holds:
//! - `simulation_results.csv`: one row per run, all strategies
//! - `summary_table.csv`: one row per duration and strategy, cents-rounded
//! - `batch_<strategy>.json` and `aggregate_<strategy>.json`
//! - `bands_<strategy>.json` when trajectories were retained

use crate::error::DataError;
use crate::repositories::series_repository::SeriesCalendar;
use chrono::NaiveDate;
use levsim_simulation::aggregate::{AggregateResult, SummaryRow, TrajectoryBands};
use levsim_simulation::monte_carlo::SimulationBatch;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Per-run results file.
pub const RESULTS_FILE: &str = "simulation_results.csv";
/// Per-duration summary file.
pub const SUMMARY_FILE: &str = "summary_table.csv";

/// CSV row for one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "Strategy")]
    pub strategy: String,
    /// Trading date the run's window starts at.
    #[serde(rename = "Start Date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "Start Index")]
    pub start_index: usize,
    #[serde(rename = "Duration (Days)")]
    pub duration_days: u32,
    #[serde(rename = "Duration (Years)")]
    pub duration_years: u32,
    #[serde(rename = "Total Invested")]
    pub total_invested: f64,
    #[serde(rename = "Total Fee")]
    pub total_fee: f64,
    #[serde(rename = "End Portfolio Value")]
    pub end_value: f64,
    #[serde(rename = "Max Drawdown")]
    pub max_drawdown: f64,
    #[serde(rename = "Total Return")]
    pub total_return: Option<f64>,
    #[serde(rename = "Annualized Return")]
    pub annualized_return: Option<f64>,
}

/// CSV row of the summary table. Money is rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "Duration (Years)")]
    pub years: u32,
    #[serde(rename = "Strategy")]
    pub strategy: String,
    #[serde(rename = "Mean_End_Value")]
    pub mean_end_value: Option<Decimal>,
    #[serde(rename = "Median_End_Value")]
    pub median_end_value: Option<Decimal>,
    #[serde(rename = "Min_End_Value")]
    pub min_end_value: Option<Decimal>,
    #[serde(rename = "Max_End_Value")]
    pub max_end_value: Option<Decimal>,
    #[serde(rename = "Mean_Invested_Amount")]
    pub mean_invested: Option<Decimal>,
    #[serde(rename = "Mean_Fee")]
    pub mean_fee: Option<Decimal>,
    #[serde(rename = "Positive_Return_Percentage")]
    pub positive_return_pct: Option<Decimal>,
    #[serde(rename = "Loss_Probability_Percentage")]
    pub loss_probability_pct: Option<Decimal>,
}

impl From<&SummaryRow> for SummaryRecord {
    fn from(row: &SummaryRow) -> Self {
        Self {
            years: row.years,
            strategy: row.strategy.clone(),
            mean_end_value: cents(row.mean_end_value),
            median_end_value: cents(row.median_end_value),
            min_end_value: cents(row.min_end_value),
            max_end_value: cents(row.max_end_value),
            mean_invested: cents(row.mean_invested),
            mean_fee: cents(row.mean_fee),
            positive_return_pct: cents(row.positive_return_pct),
            loss_probability_pct: cents(row.loss_probability_pct),
        }
    }
}

/// Rounds to two decimal places; `None` for values a decimal cannot hold.
#[must_use]
pub fn cents(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}

/// Writes and reads results in a local directory.
#[derive(Debug, Clone)]
pub struct ResultRepository {
    dir: PathBuf,
}

impl ResultRepository {
    /// Opens an output directory, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| DataError::io(&dir, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores a batch as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_batch(&self, batch: &SimulationBatch) -> Result<PathBuf, DataError> {
        let path = self
            .dir
            .join(format!("batch_{}.json", file_slug(&batch.strategy)));
        write_json(&path, batch)?;
        info!(path = %path.display(), runs = batch.runs.len(), "Saved batch");
        Ok(path)
    }

    /// Reads a batch stored by [`Self::save_batch`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_batch(path: impl AsRef<Path>) -> Result<SimulationBatch, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Stores an aggregate as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_aggregate(&self, result: &AggregateResult) -> Result<PathBuf, DataError> {
        let path = self
            .dir
            .join(format!("aggregate_{}.json", file_slug(&result.strategy)));
        write_json(&path, result)?;
        info!(path = %path.display(), buckets = result.buckets.len(), "Saved aggregate");
        Ok(path)
    }

    /// Stores per-day trajectory bands as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_bands(&self, strategy: &str, bands: &TrajectoryBands) -> Result<PathBuf, DataError> {
        let path = self.dir.join(format!("bands_{}.json", file_slug(strategy)));
        write_json(&path, bands)?;
        info!(path = %path.display(), paths = bands.paths, "Saved trajectory bands");
        Ok(path)
    }

    /// Writes every run of every batch to the results CSV, dating each run's
    /// start from the series calendar.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_runs(
        &self,
        batches: &[SimulationBatch],
        calendar: &SeriesCalendar,
    ) -> Result<PathBuf, DataError> {
        let path = self.dir.join(RESULTS_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        let mut rows = 0usize;
        for batch in batches {
            for run in &batch.runs {
                writer.serialize(RunRecord {
                    strategy: batch.strategy.clone(),
                    start_date: calendar.date_at(run.window.start()),
                    start_index: run.window.start(),
                    duration_days: run.duration_days,
                    duration_years: run.duration_years(),
                    total_invested: run.total_contributed,
                    total_fee: run.total_fees,
                    end_value: run.terminal_value,
                    max_drawdown: run.max_drawdown,
                    total_return: run.total_return,
                    annualized_return: run.annualized_return,
                })?;
                rows += 1;
            }
        }
        writer.flush().map_err(|e| DataError::io(&path, e))?;
        info!(path = %path.display(), rows, "Saved run results");
        Ok(path)
    }

    /// Writes the summary table CSV.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_summary(&self, rows: &[SummaryRow]) -> Result<PathBuf, DataError> {
        let path = self.dir.join(SUMMARY_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(SummaryRecord::from(row))?;
        }
        writer.flush().map_err(|e| DataError::io(&path, e))?;
        info!(path = %path.display(), rows = rows.len(), "Saved summary table");
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DataError> {
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Lower-case file name fragment for a strategy label.
fn file_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use levsim_domain::entities::{ReturnSeries, StrategyParams};
    use levsim_domain::enums::ContributionFrequency;
    use levsim_simulation::aggregate::{aggregate, summary_table};
    use levsim_simulation::monte_carlo::run_batch;
    use rust_decimal_macros::dec;

    const SERIES_DAYS: usize = 1500;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 1, 2).unwrap()
    }

    fn calendar() -> SeriesCalendar {
        SeriesCalendar::new(
            (0..SERIES_DAYS as u64)
                .map(|i| start() + chrono::Days::new(i))
                .collect(),
        )
    }

    fn batch() -> SimulationBatch {
        let returns = (0..SERIES_DAYS)
            .map(|i| 1.0 + (((i * 7) % 5) as f64 - 2.0) / 250.0)
            .collect();
        let series = ReturnSeries::new("^GSPC", start(), returns).unwrap();
        let params = StrategyParams::builder()
            .contribution(100.0, ContributionFrequency::Monthly)
            .build()
            .unwrap();
        let mut batch = run_batch(&series, 40, 1, 3, params, 17).unwrap();
        batch.strategy = "Leveraged S&P 500".to_string();
        batch
    }

    #[test]
    fn test_cents() {
        assert_eq!(cents(1234.5678), Some(dec!(1234.57)));
        assert_eq!(cents(0.004), Some(dec!(0.00)));
        assert_eq!(cents(f64::NAN), None);
    }

    #[test]
    fn test_file_slug() {
        assert_eq!(file_slug("Leveraged S&P 500"), "leveraged_s_p_500");
        assert_eq!(file_slug("  3x NDX "), "3x_ndx");
    }

    #[test]
    fn test_batch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ResultRepository::open(dir.path().join("out")).unwrap();
        let batch = batch();

        let path = repo.save_batch(&batch).unwrap();
        assert!(path.ends_with("batch_leveraged_s_p_500.json"));
        let loaded = ResultRepository::load_batch(&path).unwrap();
        assert_eq!(loaded.id, batch.id);
        assert_eq!(loaded.config, batch.config);
        assert_eq!(loaded.runs.len(), batch.runs.len());
        for (a, b) in loaded.runs.iter().zip(&batch.runs) {
            assert_eq!(a.window, b.window);
            assert!((a.terminal_value - b.terminal_value).abs() < 1e-6);
        }
    }

    #[test]
    fn test_csv_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ResultRepository::open(dir.path()).unwrap();
        let batch = batch();

        let runs_path = repo
            .save_runs(std::slice::from_ref(&batch), &calendar())
            .unwrap();
        let text = std::fs::read_to_string(&runs_path).unwrap();
        assert!(text.starts_with("Strategy,Start Date,Start Index,"));

        let mut reader = csv::Reader::from_path(&runs_path).unwrap();
        let records: Vec<RunRecord> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records.len(), batch.runs.len());
        assert_eq!(records[0].strategy, "Leveraged S&P 500");
        assert_eq!(records[0].end_value, batch.runs[0].terminal_value);
        for (record, run) in records.iter().zip(&batch.runs) {
            let offset = run.window.start() as u64;
            assert_eq!(record.start_date, Some(start() + chrono::Days::new(offset)));
        }

        let rows = summary_table(&[aggregate(&batch)]);
        let summary_path = repo.save_summary(&rows).unwrap();
        let text = std::fs::read_to_string(summary_path).unwrap();
        assert!(text.starts_with("Duration (Years),Strategy,Mean_End_Value"));
        assert_eq!(text.lines().count(), rows.len() + 1);
    }

    #[test]
    fn test_save_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ResultRepository::open(dir.path()).unwrap();
        let result = aggregate(&batch());
        let path = repo.save_aggregate(&result).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let parsed: AggregateResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.runs, result.runs);
        assert_eq!(parsed.buckets.len(), result.buckets.len());
        assert_eq!(parsed.risk_curve.len(), result.risk_curve.len());
    }
}
