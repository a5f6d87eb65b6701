//! The uniform result record returned by every hypothesis test.

use serde::{Deserialize, Serialize};

/// Degrees of freedom attached to a test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreesOfFreedom {
    /// The statistic has no degrees of freedom (normal-approximation tests).
    NotApplicable,
    /// A single parameter, possibly fractional (Welch–Satterthwaite).
    Single(f64),
    /// Numerator and denominator degrees of freedom of an F-statistic.
    Pair(f64, f64),
}

/// Why a test ran in approximation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproximationReason {
    /// At least one group carried only summary statistics.
    MissingRawValues,
    /// Raw values were present but a group was below the exact-path minimum.
    SmallSample,
}

impl ApproximationReason {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            ApproximationReason::MissingRawValues => "raw values were not available",
            ApproximationReason::SmallSample => "a group is too small for the rank-based path",
        }
    }

    /// What the caller can change to get the rank-based result.
    pub(crate) fn remedy(self) -> &'static str {
        match self {
            ApproximationReason::MissingRawValues => {
                "Supply raw observations for every group to run the rank-based computation"
            }
            ApproximationReason::SmallSample => {
                "Collect more observations per group or lower exact_rank_min_group_size to run the rank-based computation"
            }
        }
    }
}

/// Which computation path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestMode {
    Exact,
    Approximate { reason: ApproximationReason },
}

impl TestMode {
    pub fn is_approximate(&self) -> bool {
        matches!(self, TestMode::Approximate { .. })
    }
}

/// Conventional magnitude label for an effect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

/// The scale an effect size is reported on, with Cohen's cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EffectScale {
    /// η² or ε²: 0.01 / 0.06 / 0.14.
    VarianceExplained,
    /// Cohen's d: 0.2 / 0.5 / 0.8.
    StandardizedMeanDifference,
    /// Correlation-type r: 0.1 / 0.3 / 0.5.
    Correlation,
}

impl EffectScale {
    pub(crate) fn classify(self, effect: f64) -> Option<EffectMagnitude> {
        if !effect.is_finite() {
            return None;
        }
        let [small, medium, large] = match self {
            EffectScale::VarianceExplained => [0.01, 0.06, 0.14],
            EffectScale::StandardizedMeanDifference => [0.2, 0.5, 0.8],
            EffectScale::Correlation => [0.1, 0.3, 0.5],
        };
        let e = effect.abs();
        Some(if e >= large {
            EffectMagnitude::Large
        } else if e >= medium {
            EffectMagnitude::Medium
        } else if e >= small {
            EffectMagnitude::Small
        } else {
            EffectMagnitude::Negligible
        })
    }
}

/// Structured interpretation of a test outcome.
///
/// The content is normative, the wording of `summary` is not; report layers
/// are free to render their own text from the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub summary: String,
    /// `p_value < significance_level`.
    pub significant: bool,
    pub significance_level: f64,
    pub effect_magnitude: Option<EffectMagnitude>,
    pub approximate: bool,
}

/// Output of every hypothesis test.
///
/// `p_value` always lies in `[0, 1]`. `statistic` is `NaN` or `+∞` only in
/// the degenerate branches each test documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTestResult {
    pub test_name: String,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: DegreesOfFreedom,
    pub effect_size: Option<f64>,
    pub interpretation: Interpretation,
    pub assumptions: Vec<String>,
    pub recommendations: Vec<String>,
    pub mode: TestMode,
}

impl StatisticalTestResult {
    /// Shorthand for `interpretation.significant`.
    pub fn is_significant(&self) -> bool {
        self.interpretation.significant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_variance_explained() {
        let s = EffectScale::VarianceExplained;
        assert_eq!(s.classify(0.005), Some(EffectMagnitude::Negligible));
        assert_eq!(s.classify(0.03), Some(EffectMagnitude::Small));
        assert_eq!(s.classify(0.10), Some(EffectMagnitude::Medium));
        assert_eq!(s.classify(0.95), Some(EffectMagnitude::Large));
    }

    #[test]
    fn test_classify_uses_magnitude() {
        let s = EffectScale::StandardizedMeanDifference;
        assert_eq!(s.classify(-0.9), Some(EffectMagnitude::Large));
        assert_eq!(s.classify(f64::INFINITY), None);
        assert_eq!(s.classify(f64::NAN), None);
    }

    #[test]
    fn test_mode_flags() {
        assert!(!TestMode::Exact.is_approximate());
        let approx = TestMode::Approximate {
            reason: ApproximationReason::SmallSample,
        };
        assert!(approx.is_approximate());
    }
}
