use levsim_domain::ConfigurationError;
use thiserror::Error;

/// Errors raised by the batch driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Inputs were rejected before any run started.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The batch was cancelled; partial results were discarded.
    #[error("batch cancelled after {completed} completed runs")]
    Cancelled {
        /// Runs that finished before the batch stopped.
        completed: usize,
    },
}
