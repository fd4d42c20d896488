//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use levsim_simulation::prelude::*;
//! ```

// Aggregation
pub use crate::aggregate::{
    AggregateResult, BucketStats, DEFAULT_PERCENTILES, PercentilePoint, PercentileTable,
    RiskPoint, SummaryRow, SummaryStats, TrajectoryBands, aggregate, aggregate_with,
    summary_table, trajectory_bands,
};

// Cancellation
pub use crate::cancel::CancellationFlag;

// Errors
pub use crate::error::SimulationError;

// Batch driver
pub use crate::monte_carlo::{
    BatchConfig, MonteCarloRunner, ProgressFn, SimulationBatch, derive_run_seed, run_batch,
};

// Path simulation
pub use crate::path_simulator::{PathSimulator, SimulationRun, simulate_path};

// Window samplers
pub use crate::sampler::{CyclicWindow, StationaryBootstrap, WindowSampler, sampler_for};
