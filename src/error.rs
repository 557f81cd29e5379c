//! Error types for lattice construction, cascades and sweeps.

use thiserror::Error;

/// Errors raised by the simulation engine.
#[derive(Debug, Error)]
pub enum IsingError {
    /// Invalid construction or run parameters.
    #[error("invalid {parameter}: {reason}")]
    Config {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human readable explanation.
        reason: String,
    },
    /// Broken bookkeeping inside the engine, e.g. propagation queue overflow.
    #[error("internal error: {0}")]
    Internal(String),
    /// A worker stopped before reporting all of its temperature points.
    #[error("sweep worker failed: collected {collected} of {expected} results")]
    WorkerFailed {
        /// Results received before the result channel closed.
        collected: usize,
        /// Results the sweep was waiting for.
        expected: usize,
    },
    /// A worker thread could not be started.
    #[error("failed to spawn sweep worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl IsingError {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        IsingError::Config {
            parameter,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, IsingError>;
