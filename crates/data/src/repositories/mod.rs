//! File-backed repositories for series input and result output.

mod result_repository;
mod series_repository;

pub use result_repository::{
    RESULTS_FILE, ResultRepository, RunRecord, SUMMARY_FILE, SummaryRecord, cents,
};
pub use series_repository::{
    CsvSeriesLoader, LoadedSeries, ReturnSeriesLoader, SeriesCalendar, SeriesFormat,
};
