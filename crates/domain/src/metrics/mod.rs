//! Path and distribution metrics.

pub mod drawdown;
pub mod percentile;
pub mod returns;

pub use drawdown::DrawdownTracker;
pub use percentile::{mean, percentile, sorted};
pub use returns::{annualized_return, total_return};
