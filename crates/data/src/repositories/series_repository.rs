//! Return series loading from local CSV files.
//!
//! Files have a header row and at least two columns: an ISO date
//! (`YYYY-MM-DD`) and either a closing price or a daily return ratio. Extra
//! columns are ignored. Rows must be in strictly increasing date order.
//!
//! The core only sees return ratios; the trading dates stay here, in a
//! [`SeriesCalendar`], so results can be reported against the calendar.

use crate::error::DataError;
use chrono::NaiveDate;
use levsim_domain::entities::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

/// Supplies a return series to the simulation core.
pub trait ReturnSeriesLoader {
    /// Loads the series and its calendar.
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or holds invalid data.
    fn load(&self) -> Result<LoadedSeries, DataError>;
}

/// Trading date of each return in a series.
///
/// For price files, the date of return `i` is the date of the price it is
/// measured from, i.e. the day a position entered at index `i` is bought.
/// For return files it is the row's own date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesCalendar {
    dates: Vec<NaiveDate>,
}

impl SeriesCalendar {
    #[must_use]
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    /// Date of return `index`, wrapping past the end like sample windows do.
    #[must_use]
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if self.dates.is_empty() {
            return None;
        }
        Some(self.dates[index % self.dates.len()])
    }
}

/// A series together with the dates it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub series: ReturnSeries,
    pub calendar: SeriesCalendar,
}

/// What the value column of a series file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesFormat {
    /// Adjusted closing prices; returns are derived from consecutive rows.
    #[default]
    Prices,
    /// Daily return ratios (1.012 = +1.2%).
    Returns,
}

/// Loads a series from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvSeriesLoader {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Index identifier attached to the series.
    pub ticker: String,
    /// Value column content.
    pub format: SeriesFormat,
    /// Rows dated before this are skipped.
    pub start_date: Option<NaiveDate>,
}

impl CsvSeriesLoader {
    /// Creates a loader for a price file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ticker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ticker: ticker.into(),
            format: SeriesFormat::Prices,
            start_date: None,
        }
    }

    /// Sets the value column format.
    #[must_use]
    pub fn with_format(mut self, format: SeriesFormat) -> Self {
        self.format = format;
        self
    }

    /// Skips rows before `start_date`.
    #[must_use]
    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Loads a series from any reader holding CSV text.
    ///
    /// # Errors
    /// Returns an error on malformed rows, unordered dates, or values the
    /// domain rejects.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<LoadedSeries, DataError> {
        let rows = read_rows(reader, self.start_date)?;
        let Some(&(first_date, _)) = rows.first() else {
            return Err(levsim_domain::ConfigurationError::EmptySeries {
                ticker: self.ticker.clone(),
            }
            .into());
        };
        let values: Vec<f64> = rows.iter().map(|&(_, v)| v).collect();
        let mut dates: Vec<NaiveDate> = rows.iter().map(|&(d, _)| d).collect();

        let series = match self.format {
            SeriesFormat::Prices => {
                dates.pop();
                ReturnSeries::from_prices(&self.ticker, first_date, &values)?
            }
            SeriesFormat::Returns => ReturnSeries::new(&self.ticker, first_date, values)?,
        };
        info!(
            ticker = %self.ticker,
            start_date = %series.start_date(),
            days = series.len(),
            years = series.years(),
            "Loaded return series"
        );
        Ok(LoadedSeries {
            series,
            calendar: SeriesCalendar::new(dates),
        })
    }
}

impl ReturnSeriesLoader for CsvSeriesLoader {
    fn load(&self) -> Result<LoadedSeries, DataError> {
        debug!(path = %self.path.display(), format = ?self.format, "Reading series file");
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::io(&self.path, e))?;
        self.load_from_reader(file)
    }
}

fn read_rows<R: Read>(
    reader: R,
    start_date: Option<NaiveDate>,
) -> Result<Vec<(NaiveDate, f64)>, DataError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    let mut previous: Option<NaiveDate> = None;
    for record in csv.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let date_field = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|e| {
            DataError::Parse {
                line,
                message: format!("invalid date '{date_field}': {e}"),
            }
        })?;
        let value_field = record.get(1).unwrap_or_default();
        let value: f64 = value_field.parse().map_err(|_| DataError::Parse {
            line,
            message: format!("invalid value '{value_field}'"),
        })?;

        if previous.is_some_and(|prev| date <= prev) {
            return Err(DataError::NotChronological { line, date });
        }
        previous = Some(date);
        if start_date.is_some_and(|start| date < start) {
            continue;
        }
        rows.push((date, value));
    }
    Ok(rows)
}
