//! Preflight checks on measured rounds.
//!
//! These checks flag measurements that should not be trusted before they
//! end up in a report. Warnings are informational; only critical ones mark
//! the result as invalid.
//!
//! # Checks Performed
//!
//! - **Quantization**: rounds must be positive after overhead subtraction
//!   and must span enough clock precision bounds

mod resolution;

pub use resolution::{quantization_check, QuantizationWarning};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of running all preflight checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightResult {
    /// All warnings collected from preflight checks.
    pub warnings: Vec<QuantizationWarning>,

    /// Whether any critical warnings were found.
    pub has_critical: bool,

    /// Whether the measurement is considered valid.
    pub is_valid: bool,
}

impl Default for PreflightResult {
    fn default() -> Self {
        Self::new()
    }
}

impl PreflightResult {
    /// Create a new empty preflight result.
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            has_critical: false,
            is_valid: true,
        }
    }

    /// Add a quantization warning.
    pub fn add_quantization_warning(&mut self, warning: QuantizationWarning) {
        if warning.is_critical() {
            self.has_critical = true;
            self.is_valid = false;
        }
        self.warnings.push(warning);
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run all preflight checks on per-round durations and collect warnings.
pub fn run_all_checks(round_samples_ns: &[f64], precision_ns: f64) -> PreflightResult {
    let mut result = PreflightResult::new();

    if let Some(warning) = quantization_check(round_samples_ns, precision_ns) {
        warn!(critical = warning.is_critical(), "{}", warning.description());
        result.add_quantization_warning(warning);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_result_default() {
        let result = PreflightResult::new();
        assert!(result.is_valid);
        assert!(!result.has_critical);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_critical_warning_invalidates() {
        let result = run_all_checks(&[100.0, -1.0], 1.0);
        assert!(result.has_warnings());
        assert!(result.has_critical);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_non_critical_warning_keeps_valid() {
        let result = run_all_checks(&[10.0, 12.0], 1.0);
        assert!(result.has_warnings());
        assert!(!result.has_critical);
        assert!(result.is_valid);
    }
}
