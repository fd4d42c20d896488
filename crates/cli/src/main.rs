//! Command Line Interface for the leveraged index simulator.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use levsim_data::{
    CsvSeriesLoader, LoadedSeries, ResultRepository, ReturnSeriesLoader, SeriesFormat,
    StrategyBook,
};
use levsim_domain::enums::SamplingPolicy;
use levsim_domain::value_objects::DurationRange;
use levsim_simulation::aggregate::{
    AggregateResult, DEFAULT_PERCENTILES, SummaryRow, aggregate, summary_table, trajectory_bands,
};
use levsim_simulation::cancel::CancellationFlag;
use levsim_simulation::monte_carlo::{BatchConfig, MonteCarloRunner, ProgressFn};
use prettytable::{Table, row};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "levsim")]
#[command(about = "Monte Carlo simulator for standard and leveraged index funds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate every strategy of a book over a historical series
    Simulate {
        /// CSV file with `date,value` rows
        #[arg(short, long)]
        series: PathBuf,

        /// What the value column holds
        #[arg(long, value_enum, default_value_t = Format::Prices)]
        format: Format,

        /// JSON strategy book (defaults to the built-in S&P 500 book)
        #[arg(short, long)]
        book: Option<PathBuf>,

        /// Runs per strategy
        #[arg(short = 'n', long, default_value_t = 1000)]
        simulations: usize,

        /// Shortest holding period in years
        #[arg(long, default_value_t = 1)]
        min_years: u32,

        /// Longest holding period in years
        #[arg(long, default_value_t = 20)]
        max_years: u32,

        /// Batch seed; every strategy reuses it so they see the same windows
        #[arg(long, env = "LEVSIM_SEED", default_value_t = 42)]
        seed: u64,

        /// Directory for CSV and JSON results
        #[arg(short, long, env = "LEVSIM_OUTPUT_DIR", default_value = "results")]
        output_dir: PathBuf,

        /// How windows are drawn from the series
        #[arg(long, value_enum, default_value_t = Sampling::Cyclic)]
        sampling: Sampling,

        /// Mean block length for bootstrap sampling
        #[arg(long, default_value_t = 21)]
        mean_block_days: u32,

        /// Keep per-day values and write percentile bands
        #[arg(long)]
        retain_trajectories: bool,
    },
    /// Re-aggregate a stored batch and print it
    Report {
        /// Batch JSON written by `simulate`
        #[arg(short, long)]
        batch: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Prices,
    Returns,
}

impl From<Format> for SeriesFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Prices => SeriesFormat::Prices,
            Format::Returns => SeriesFormat::Returns,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Sampling {
    Cyclic,
    Bootstrap,
}

impl Sampling {
    fn policy(self, mean_block_days: u32) -> SamplingPolicy {
        match self {
            Sampling::Cyclic => SamplingPolicy::Cyclic,
            Sampling::Bootstrap => SamplingPolicy::StationaryBootstrap { mean_block_days },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            series: series_path,
            format,
            book,
            simulations,
            min_years,
            max_years,
            seed,
            output_dir,
            sampling,
            mean_block_days,
            retain_trajectories,
        } => {
            let book = match book {
                Some(path) => StrategyBook::load(&path)
                    .with_context(|| format!("loading strategy book {}", path.display()))?,
                None => StrategyBook::sp500_default()?,
            };
            let durations = DurationRange::new(min_years, max_years)?;
            let config = BatchConfig::new(simulations, durations, seed)
                .with_sampling(sampling.policy(mean_block_days))
                .with_trajectories(retain_trajectories);
            config.validate()?;

            let LoadedSeries { series, calendar } =
                CsvSeriesLoader::new(&series_path, book.index.clone())
                    .with_format(format.into())
                    .with_start_date(book.start_date)
                    .load()
                    .with_context(|| format!("loading return series {}", series_path.display()))?;
            let series = Arc::new(series);
            let repository = ResultRepository::open(&output_dir)?;

            let cancel = CancellationFlag::new();
            let watcher = cancel.clone();
            let signal = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling simulation");
                    watcher.cancel();
                }
            });

            println!(
                "Simulating {} strategies on {} ({} trading days)...",
                book.strategies.len(),
                series.ticker(),
                series.len()
            );

            let mut batches = Vec::with_capacity(book.strategies.len());
            let mut aggregates = Vec::with_capacity(book.strategies.len());
            for definition in &book.strategies {
                let series = Arc::clone(&series);
                let name = definition.name.clone();
                let params = definition.params;
                let config = config.clone();
                let cancel = cancel.clone();
                let progress = progress_logger(name.clone(), config.n_simulations);
                let batch = tokio::task::spawn_blocking(move || {
                    MonteCarloRunner::new(&series, name, params, config)
                        .with_cancellation(cancel)
                        .with_progress(progress)
                        .run()
                })
                .await??;

                repository.save_batch(&batch)?;
                let result = aggregate(&batch);
                repository.save_aggregate(&result)?;
                if let Some(bands) = trajectory_bands(&batch, &DEFAULT_PERCENTILES) {
                    repository.save_bands(&batch.strategy, &bands)?;
                }
                batches.push(batch);
                aggregates.push(result);
            }
            signal.abort();

            let rows = summary_table(&aggregates);
            repository.save_runs(&batches, &calendar)?;
            repository.save_summary(&rows)?;
            info!(output_dir = %repository.dir().display(), "Simulation finished");

            print_summary(&rows);
            print_risk_curves(&aggregates);
        }
        Commands::Report { batch: batch_path } => {
            let batch = ResultRepository::load_batch(&batch_path)
                .with_context(|| format!("reading batch {}", batch_path.display()))?;
            println!(
                "Batch {} | {} on {} | {} runs",
                batch.id,
                batch.strategy,
                batch.ticker,
                batch.runs.len()
            );
            let result = aggregate(&batch);
            print_buckets(&result);
            print_summary(&summary_table(std::slice::from_ref(&result)));
        }
    }

    Ok(())
}

/// Logs every tenth of a batch.
fn progress_logger(strategy: String, total: usize) -> ProgressFn {
    let step = (total / 10).max(1);
    Arc::new(move |done| {
        if done % step == 0 {
            info!(strategy = %strategy, done, total, "Simulation progress");
        }
    })
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn print_summary(rows: &[SummaryRow]) {
    let mut table = Table::new();
    table.set_titles(row![
        "Years", "Strategy", "Mean", "Median", "Min", "Max", "Invested", "Fees", "Gain %",
        "Loss %"
    ]);
    for r in rows {
        table.add_row(row![
            r.years,
            r.strategy,
            money(r.mean_end_value),
            money(r.median_end_value),
            money(r.min_end_value),
            money(r.max_end_value),
            money(r.mean_invested),
            money(r.mean_fee),
            money(r.positive_return_pct),
            money(r.loss_probability_pct)
        ]);
    }
    table.printstd();
}

fn print_buckets(result: &AggregateResult) {
    let mut table = Table::new();
    table.set_titles(row![
        "Years", "Runs", "P5", "P25", "P50", "P75", "P95", "Median DD", "Ann. Return"
    ]);
    for b in &result.buckets {
        let p = |rank: f64| {
            b.terminal_percentiles
                .get(rank)
                .map_or_else(|| "-".to_string(), money)
        };
        let drawdown = b
            .drawdown_percentiles
            .get(50.0)
            .map_or_else(|| "-".to_string(), |d| format!("{:.1}%", d * 100.0));
        let annualized = b
            .mean_annualized_return
            .map_or_else(|| "-".to_string(), |r| format!("{:.2}%", r * 100.0));
        table.add_row(row![
            b.years,
            b.count,
            p(5.0),
            p(25.0),
            p(50.0),
            p(75.0),
            p(95.0),
            drawdown,
            annualized
        ]);
    }
    table.printstd();
}

fn print_risk_curves(results: &[AggregateResult]) {
    for result in results {
        let curve: Vec<String> = result
            .risk_curve
            .iter()
            .map(|point| format!("{}y {:.1}%", point.years, point.probability_of_loss * 100.0))
            .collect();
        println!("Loss probability, {}: {}", result.strategy, curve.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["levsim", "simulate", "--series", "gspc.csv"]).unwrap();
        match cli.command {
            Commands::Simulate {
                format,
                simulations,
                min_years,
                max_years,
                sampling,
                retain_trajectories,
                ..
            } => {
                assert_eq!(format, Format::Prices);
                assert_eq!(simulations, 1000);
                assert_eq!((min_years, max_years), (1, 20));
                assert_eq!(sampling, Sampling::Cyclic);
                assert!(!retain_trajectories);
            }
            Commands::Report { .. } => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_rejects_overflowing_duration() {
        let cli = Cli::try_parse_from([
            "levsim",
            "simulate",
            "--series",
            "gspc.csv",
            "--max-years",
            "20000000",
        ])
        .unwrap();
        let Commands::Simulate {
            min_years,
            max_years,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert!(DurationRange::new(min_years, max_years).is_err());
    }

    #[test]
    fn test_sampling_policy() {
        assert_eq!(Sampling::Cyclic.policy(10), SamplingPolicy::Cyclic);
        assert_eq!(
            Sampling::Bootstrap.policy(10),
            SamplingPolicy::StationaryBootstrap { mean_block_days: 10 }
        );
    }
}
