//! Error taxonomy shared by every fallible operation in the crate.
//!
//! Degenerate inputs that still have a well-defined answer (zero variance,
//! perfect separation, all-tied ranks) are **not** errors; they produce a
//! regular [`StatisticalTestResult`](crate::result::StatisticalTestResult).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors reported by special functions, distributions, and tests.
///
/// None of these are retried internally; the caller decides whether to skip
/// the test, substitute an approximation, or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Argument outside the mathematical domain of a function.
    #[error("{function}: {message}")]
    Domain {
        function: &'static str,
        message: String,
    },

    /// Group-count, sample-size, or statistical-precondition violation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A series or continued fraction exhausted its iteration cap.
    #[error("{context} did not converge after {iterations} iterations")]
    Convergence {
        context: &'static str,
        iterations: usize,
    },

    /// A computed intermediate was NaN or infinite where a finite value was required.
    #[error("numerical instability in {context}: got {value}")]
    NumericalInstability { context: String, value: f64 },
}

impl StatsError {
    pub(crate) fn domain(function: &'static str, message: impl Into<String>) -> Self {
        StatsError::Domain {
            function,
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        StatsError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_display() {
        let err = StatsError::domain("ln_gamma", "x must be positive, got -1");
        let msg = err.to_string();
        assert!(msg.contains("ln_gamma"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn test_convergence_display() {
        let err = StatsError::Convergence {
            context: "incomplete_gamma series",
            iterations: 100,
        };
        assert_eq!(
            err.to_string(),
            "incomplete_gamma series did not converge after 100 iterations"
        );
    }

    #[test]
    fn test_instability_carries_context() {
        let err = StatsError::NumericalInstability {
            context: "ANOVA F-statistic".into(),
            value: f64::INFINITY,
        };
        assert!(err.to_string().contains("ANOVA F-statistic"));
        assert!(err.to_string().contains("inf"));
    }
}
