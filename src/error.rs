//! Error types.

use thiserror::Error;

/// Calibration could not produce a meaningful precision bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// An iteration count of zero was requested.
    #[error("calibration needs at least one iteration")]
    ZeroIterations,

    /// No strictly positive delta was observed between two clock samples.
    #[error("clock never advanced between consecutive samples in {iterations} iterations")]
    NoObservableDelta {
        /// Iterations that were attempted.
        iterations: usize,
    },
}

/// Invalid benchmark configuration, reported before any measurement starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Upper set size is below the lower one.
    #[error("parameter error: 'to' ({to}) < 'from' ({from})")]
    ToBelowFrom {
        /// Lower bound.
        from: u32,
        /// Upper bound.
        to: u32,
    },

    /// Upper set size exceeds the supported maximum.
    #[error("parameter error: value of 'to' ({to}) too big, maximum is {max}")]
    SetSizeTooLarge {
        /// Requested upper bound.
        to: u32,
        /// Supported maximum.
        max: u32,
    },

    /// Time budget per configuration is not positive.
    #[error("parameter error: seconds per config ({0}) must be positive")]
    NonPositiveBudget(f64),

    /// Expected runtime per add is not positive.
    #[error("parameter error: expected runtime per add ({0}ns) must be positive")]
    NonPositiveRuntime(f64),

    /// One round does not fit into the total budget.
    #[error("parameter error: adds per round ({per_round}) too big for {total} adds per config")]
    RoundExceedsBudget {
        /// Requested adds per round.
        per_round: u32,
        /// Total adds per configuration.
        total: u32,
    },

    /// One round cannot hold the largest set.
    #[error("parameter error: adds per round ({per_round}) too small for set size {to}")]
    RoundTooSmall {
        /// Requested adds per round.
        per_round: u32,
        /// Largest set size.
        to: u32,
    },

    /// Step could not be parsed or is not positive.
    #[error("invalid step '{0}': expected a positive percentage (e.g. \"2.5%\") or a positive integer")]
    InvalidStep(String),

    /// Relative headroom limit is negative or not finite.
    #[error("invalid limit {0}%: expected a finite, non-negative percentage")]
    InvalidLimit(f64),

    /// A set must receive at least one value.
    #[error("set size must be at least 1")]
    EmptySet,
}
