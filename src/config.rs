//! Tunables for the hypothesis tests.
//!
//! Every test has a plain entry point that uses [`TestConfig::default`] and a
//! `*_with` variant that takes an explicit configuration. Configurations are
//! plain values; nothing here is global.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// How Welch's t-test converts its statistic into a p-value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WelchPValue {
    /// Two-tailed standard normal tail, regardless of degrees of freedom.
    ///
    /// Reports built on earlier results depend on this behavior.
    #[default]
    NormalApproximation,
    /// Two-tailed Student-t tail at the Welch–Satterthwaite degrees of freedom.
    StudentT,
}

/// Configuration shared by all tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Threshold α below which a p-value is reported as significant.
    pub significance_level: f64,
    /// Minimum per-group size for the rank-based Mann-Whitney path.
    pub exact_rank_min_group_size: usize,
    /// p-value method for Welch's t-test.
    pub welch_p_value: WelchPValue,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            exact_rank_min_group_size: 8,
            welch_p_value: WelchPValue::NormalApproximation,
        }
    }
}

impl TestConfig {
    /// Sets the significance level.
    pub fn with_significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }

    /// Sets the Welch p-value method.
    pub fn with_welch_p_value(mut self, method: WelchPValue) -> Self {
        self.welch_p_value = method;
        self
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `significance_level` is outside `(0, 1)`
    /// or `exact_rank_min_group_size` is zero.
    pub fn validate(&self) -> StatsResult<()> {
        let alpha = self.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::validation(format!(
                "significance level must lie in (0, 1), got {alpha}"
            )));
        }
        if self.exact_rank_min_group_size == 0 {
            return Err(StatsError::validation(
                "exact rank minimum group size must be at least 1",
            ));
        }
        Ok(())
    }
}
