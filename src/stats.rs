//! Descriptive summaries used to build group statistics and to standardize
//! samples.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier-compensated summation, error O(ε) independent of n.
//! - **Variance**: Welford's online update; partial summaries combine with
//!   Chan et al.'s pairwise formula.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).

/// Arithmetic mean with compensated summation.
///
/// `None` for empty input or any NaN/Inf.
///
/// # Examples
/// ```
/// use u_inference::stats::mean;
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap() - 3.0).abs() < 1e-15);
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample variance (denominator `n − 1`).
///
/// `None` for fewer than 2 values or any NaN/Inf.
///
/// # Examples
/// ```
/// use u_inference::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 32.0 / 7.0).abs() < 1e-12);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    data.iter()
        .copied()
        .collect::<WelfordAccumulator>()
        .sample_variance()
}

/// Compensated sum (Neumaier's variant of Kahan summation).
///
/// Stays exact when an addend is larger in magnitude than the running sum,
/// which plain Kahan summation does not.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let (sum, compensation) = data.iter().fold((0.0_f64, 0.0_f64), |(sum, comp), &x| {
        let next = sum + x;
        let lost = if sum.abs() >= x.abs() {
            (sum - next) + x
        } else {
            (x - next) + sum
        };
        (next, comp + lost)
    });
    sum + compensation
}

/// Streaming count/mean/variance summary.
///
/// Partial summaries of one column (for example, per chunk of a large file)
/// merge into the summary of the whole; see
/// [`GroupData::from_accumulator`](crate::GroupData::from_accumulator).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WelfordAccumulator {
    n: u64,
    running_mean: f64,
    /// Sum of squared deviations from the running mean.
    sum_sq_dev: f64,
}

impl WelfordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    pub fn update(&mut self, value: f64) {
        self.n += 1;
        let before = value - self.running_mean;
        self.running_mean += before / self.n as f64;
        let after = value - self.running_mean;
        self.sum_sq_dev += before * after;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    /// Running mean; `None` before the first observation.
    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.running_mean)
    }

    /// Sample variance; `None` before the second observation.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.n > 1).then(|| self.sum_sq_dev / (self.n - 1) as f64)
    }

    /// Folds `other` into `self`.
    ///
    /// Reference: Chan, Golub & LeVeque (1979), "Updating Formulae and a
    /// Pairwise Algorithm for Computing Sample Variances".
    pub fn merge(&mut self, other: &WelfordAccumulator) {
        match (self.n, other.n) {
            (_, 0) => {}
            (0, _) => *self = other.clone(),
            (na, nb) => {
                let n = na + nb;
                let weight = nb as f64 / n as f64;
                let shift = other.running_mean - self.running_mean;
                self.running_mean += shift * weight;
                self.sum_sq_dev += other.sum_sq_dev + shift * shift * na as f64 * weight;
                self.n = n;
            }
        }
    }
}

impl FromIterator<f64> for WelfordAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        iter.into_iter().for_each(|x| acc.update(x));
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_rejects_empty_and_non_finite() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, f64::NAN]), None);
        assert_eq!(mean(&[1.0, f64::INFINITY]), None);
    }

    #[test]
    fn test_variance_edge_cases() {
        assert_eq!(variance(&[3.0]), None);
        assert_eq!(variance(&[3.0, 3.0]), Some(0.0));
        assert_eq!(variance(&[1.0, f64::NAN, 2.0]), None);
    }

    #[test]
    fn test_variance_survives_large_offset() {
        let v = [1e9 + 4.0, 1e9 + 7.0, 1e9 + 13.0, 1e9 + 16.0];
        assert!((variance(&v).unwrap() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_kahan_sum_recovers_small_term() {
        assert_eq!(kahan_sum(&[1e16, 1.0, -1e16]), 1.0);
        assert_eq!(kahan_sum(&[]), 0.0);
    }

    #[test]
    fn test_accumulator_chunks_match_whole() {
        let column: Vec<f64> = (1..=9).map(f64::from).collect();
        let mut merged = WelfordAccumulator::new();
        for chunk in column.chunks(4) {
            merged.merge(&chunk.iter().copied().collect::<WelfordAccumulator>());
        }
        assert_eq!(merged.count(), 9);
        assert!((merged.mean().unwrap() - 5.0).abs() < 1e-14);
        assert!((merged.sample_variance().unwrap() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_empty_cases() {
        let empty = WelfordAccumulator::new();
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.sample_variance(), None);

        let filled: WelfordAccumulator = [2.0, 4.0].into_iter().collect();
        let mut target = WelfordAccumulator::new();
        target.merge(&filled);
        assert_eq!(target, filled);
        target.merge(&empty);
        assert_eq!(target, filled);
    }
}
