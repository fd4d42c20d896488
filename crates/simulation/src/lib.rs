//! Monte Carlo engine for leveraged index strategies.
//!
//! This crate turns a historical return series into a distribution of
//! investment outcomes:
//! - Window sampling over the historical series
//! - Path simulation with contributions, leverage and fees
//! - A parallel, seeded, cancellable batch driver
//! - Aggregation into per-duration percentile tables and risk curves

/// Prelude module for convenient imports.
pub mod prelude;

/// Distribution statistics over a batch.
pub mod aggregate;
/// Cooperative batch cancellation.
pub mod cancel;
/// Simulation errors.
pub mod error;
/// Batch driver.
pub mod monte_carlo;
/// Single-path simulation.
pub mod path_simulator;
/// Window sampling policies.
pub mod sampler;
