pub mod return_series;
pub mod strategy;

pub use return_series::ReturnSeries;
pub use strategy::{StrategyParams, StrategyParamsBuilder};
