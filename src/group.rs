//! Per-group sample summaries fed into the hypothesis tests.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::stats::{self, WelfordAccumulator};

/// One sample group: summary statistics and, optionally, the raw values.
///
/// Rank-based tests need `values`; without them they fall back to an
/// approximation that is flagged in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    /// Label used in interpretation text.
    pub name: String,
    /// Number of observations.
    pub count: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample variance (n − 1 denominator).
    pub variance: f64,
    /// Raw observations; when present, `values.len() == count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

impl GroupData {
    /// Creates a summary-only group.
    ///
    /// # Examples
    /// ```
    /// use u_inference::GroupData;
    /// let g = GroupData::new("control", 30, 10.0, 4.0);
    /// assert!(!g.has_values());
    /// ```
    pub fn new(name: impl Into<String>, count: usize, mean: f64, variance: f64) -> Self {
        Self {
            name: name.into(),
            count,
            mean,
            variance,
            values: None,
        }
    }

    /// Attaches raw observations to a summary.
    ///
    /// The caller keeps `values.len() == count`;
    /// [`validate_group_inputs`](crate::guards::validate_group_inputs) rejects
    /// mismatches.
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = Some(values);
        self
    }

    /// Builds a group from raw observations.
    ///
    /// The mean uses Kahan summation and the variance Welford's algorithm; a
    /// single observation has variance 0.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `values` is empty or contains a
    /// non-finite number.
    ///
    /// # Examples
    /// ```
    /// use u_inference::GroupData;
    /// let g = GroupData::from_values("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// assert_eq!(g.count, 5);
    /// assert!((g.mean - 3.0).abs() < 1e-15);
    /// assert!((g.variance - 2.5).abs() < 1e-12);
    /// ```
    pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> StatsResult<Self> {
        let name = name.into();
        let mean = stats::mean(&values).ok_or_else(|| {
            StatsError::validation(format!(
                "group '{name}' needs at least one finite observation"
            ))
        })?;
        let variance = stats::variance(&values).unwrap_or(0.0);
        Ok(Self {
            name,
            count: values.len(),
            mean,
            variance,
            values: Some(values),
        })
    }

    /// Builds a summary-only group from a streaming accumulator.
    ///
    /// A single observation has variance 0.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if the accumulator is empty.
    ///
    /// # Examples
    /// ```
    /// use u_inference::{stats::WelfordAccumulator, GroupData};
    /// let mut acc = WelfordAccumulator::new();
    /// for chunk in [[1.0, 2.0], [3.0, 4.0]] {
    ///     acc.merge(&chunk.into_iter().collect::<WelfordAccumulator>());
    /// }
    /// let g = GroupData::from_accumulator("streamed", &acc).unwrap();
    /// assert_eq!(g.count, 4);
    /// assert!((g.mean - 2.5).abs() < 1e-15);
    /// ```
    pub fn from_accumulator(
        name: impl Into<String>,
        acc: &WelfordAccumulator,
    ) -> StatsResult<Self> {
        let name = name.into();
        let mean = acc.mean().ok_or_else(|| {
            StatsError::validation(format!("group '{name}' has no observations"))
        })?;
        let count = usize::try_from(acc.count()).map_err(|_| {
            StatsError::validation(format!("group '{name}' is too large to index"))
        })?;
        Ok(Self::new(name, count, mean, acc.sample_variance().unwrap_or(0.0)))
    }

    /// Returns `true` if raw observations are attached.
    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_single_observation() {
        let g = GroupData::from_values("x", vec![7.0]).unwrap();
        assert_eq!(g.count, 1);
        assert_eq!(g.mean, 7.0);
        assert_eq!(g.variance, 0.0);
        assert!(g.has_values());
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert!(matches!(
            GroupData::from_values("empty", vec![]),
            Err(StatsError::Validation(_))
        ));
        assert!(GroupData::from_values("nan", vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_from_accumulator() {
        assert!(GroupData::from_accumulator("e", &WelfordAccumulator::new()).is_err());
        let acc: WelfordAccumulator = [5.0].into_iter().collect();
        let g = GroupData::from_accumulator("one", &acc).unwrap();
        assert_eq!((g.count, g.mean, g.variance), (1, 5.0, 0.0));
        assert!(!g.has_values());
    }

    #[test]
    fn test_with_values_keeps_summary() {
        let g = GroupData::new("g", 3, 2.0, 1.0).with_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(g.count, 3);
        assert_eq!(g.values.as_deref(), Some(&[1.0, 2.0, 3.0][..]));
    }
}
