//! Mann-Whitney U test for two independent groups.

use tracing::{debug, warn};

use super::{strings, two_tailed_normal_p, Effect, Findings};
use crate::config::TestConfig;
use crate::error::StatsResult;
use crate::group::GroupData;
use crate::guards::{check_finite, validate_group};
use crate::rank::rank_samples;
use crate::result::{
    ApproximationReason, DegreesOfFreedom, EffectScale, StatisticalTestResult, TestMode,
};

/// Mann-Whitney U test with default configuration.
///
/// See [`mann_whitney_u_test_with`].
///
/// # Examples
/// ```
/// use u_inference::{mann_whitney_u_test, GroupData};
/// let a = GroupData::from_values("a", (1..=10).map(f64::from).collect()).unwrap();
/// let b = GroupData::from_values("b", (11..=20).map(f64::from).collect()).unwrap();
/// let r = mann_whitney_u_test(&a, &b).unwrap();
/// assert_eq!(r.statistic, 0.0);
/// assert!(r.p_value < 0.001);
/// ```
pub fn mann_whitney_u_test(
    group1: &GroupData,
    group2: &GroupData,
) -> StatsResult<StatisticalTestResult> {
    mann_whitney_u_test_with(group1, group2, &TestConfig::default())
}

/// Mann-Whitney U test (Wilcoxon rank-sum).
///
/// With raw values in both groups and both sizes at least
/// `config.exact_rank_min_group_size`, the samples are pooled and ranked:
///
/// ```text
/// U₁ = R₁ − n₁(n₁+1)/2,  U₂ = n₁n₂ − U₁,  U = min(U₁, U₂)
/// σ² = n₁n₂/12 · ((N+1) − Σ(t³ − t) / (N(N−1)))
/// z  = (U − n₁n₂/2) / σ,  p = 2(1 − Φ(|z|)),  r = |z| / √N
/// ```
///
/// If every observation is tied, `σ² = 0` and the result is `z = 0, p = 1`.
///
/// Otherwise the test falls back to a standardized mean difference computed
/// from the summaries and reports `z` as the statistic, flagged as
/// approximate.
///
/// # Errors
/// - [`StatsError::Validation`](crate::StatsError::Validation) for invalid groups
/// - [`StatsError::NumericalInstability`](crate::StatsError::NumericalInstability)
///   if z is not finite on the rank-based path
pub fn mann_whitney_u_test_with(
    group1: &GroupData,
    group2: &GroupData,
    config: &TestConfig,
) -> StatsResult<StatisticalTestResult> {
    config.validate()?;
    validate_group(group1)?;
    validate_group(group2)?;

    let min_size = config.exact_rank_min_group_size;
    let outcome = match (group1.values.as_deref(), group2.values.as_deref()) {
        (Some(a), Some(b)) if a.len() >= min_size && b.len() >= min_size => ranked(a, b)?,
        (Some(_), Some(_)) => {
            warn!(
                test = "mann_whitney",
                reason = "small_sample",
                n1 = group1.count,
                n2 = group2.count,
                min_size,
                "group below rank-based minimum, using normal approximation"
            );
            approximate(group1, group2, ApproximationReason::SmallSample)
        }
        _ => {
            warn!(
                test = "mann_whitney",
                reason = "missing_raw_values",
                n1 = group1.count,
                n2 = group2.count,
                "raw values missing, using normal approximation"
            );
            approximate(group1, group2, ApproximationReason::MissingRawValues)
        }
    };

    debug!(
        statistic = outcome.statistic,
        z = outcome.z,
        p = outcome.p_value,
        "Mann-Whitney U test computed"
    );

    let (statistic_label, assumptions) = if outcome.mode.is_approximate() {
        (
            "z",
            strings(&[
                "Observations are independent within and across groups",
                "Group means summarize location well enough for a normal approximation",
            ]),
        )
    } else {
        (
            "U",
            strings(&[
                "Observations are independent within and across groups",
                "The response is at least ordinal",
                "Both distributions have a similar shape when comparing medians",
            ]),
        )
    };

    let mut recommendations = Vec::new();
    if outcome.tied_fraction > 0.25 {
        recommendations.push(
            "Many tied values; the tie-corrected normal approximation loses accuracy".to_string(),
        );
    }

    Ok(Findings {
        test_name: "Mann-Whitney U test",
        statistic_label,
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        degrees_of_freedom: DegreesOfFreedom::NotApplicable,
        effect: outcome.effect_r.map(|value| Effect {
            value,
            scale: EffectScale::Correlation,
            label: "r",
        }),
        mode: outcome.mode,
        significant_finding: format!(
            "Distributions of '{}' and '{}' differ significantly",
            group1.name, group2.name
        ),
        null_finding: format!(
            "No significant difference between the distributions of '{}' and '{}'",
            group1.name, group2.name
        ),
        assumptions,
        recommendations,
    }
    .into_result(config))
}

struct Outcome {
    statistic: f64,
    z: f64,
    p_value: f64,
    effect_r: Option<f64>,
    mode: TestMode,
    /// Share of pooled observations sitting in a tie block.
    tied_fraction: f64,
}

fn ranked(a: &[f64], b: &[f64]) -> StatsResult<Outcome> {
    let ranks = rank_samples(&[a, b]);
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let n = n1 + n2;

    let u1 = ranks.rank_sums[0] - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.min(u2);

    let variance = n1 * n2 / 12.0 * ((n + 1.0) - ranks.tie_term / (n * (n - 1.0)));
    let tied_fraction = tied_share(a, b);
    if variance <= 0.0 {
        debug!("Mann-Whitney: every observation is tied");
        return Ok(Outcome {
            statistic: u,
            z: 0.0,
            p_value: 1.0,
            effect_r: Some(0.0),
            mode: TestMode::Exact,
            tied_fraction,
        });
    }

    let z = check_finite((u - n1 * n2 / 2.0) / variance.sqrt(), "Mann-Whitney z")?;
    Ok(Outcome {
        statistic: u,
        z,
        p_value: two_tailed_normal_p(z),
        effect_r: Some(z.abs() / n.sqrt()),
        mode: TestMode::Exact,
        tied_fraction,
    })
}

fn approximate(group1: &GroupData, group2: &GroupData, reason: ApproximationReason) -> Outcome {
    let n1 = group1.count as f64;
    let n2 = group2.count as f64;
    let diff = group1.mean - group2.mean;
    let standard_error = (group1.variance / n1 + group2.variance / n2).sqrt();

    let z = if standard_error > 0.0 {
        diff / standard_error
    } else if diff == 0.0 {
        debug!("Mann-Whitney: zero spread and equal means");
        0.0
    } else {
        debug!("Mann-Whitney: zero spread with distinct means");
        f64::INFINITY.copysign(diff)
    };

    let tied_fraction = match (group1.values.as_deref(), group2.values.as_deref()) {
        (Some(a), Some(b)) => tied_share(a, b),
        _ => 0.0,
    };

    Outcome {
        statistic: z,
        z,
        p_value: two_tailed_normal_p(z),
        effect_r: z.is_finite().then(|| z.abs() / (n1 + n2).sqrt()),
        mode: TestMode::Approximate { reason },
        tied_fraction,
    }
}

fn tied_share(a: &[f64], b: &[f64]) -> f64 {
    let mut pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    if pooled.is_empty() {
        return 0.0;
    }
    pooled.sort_by(f64::total_cmp);
    let tied = (0..pooled.len())
        .filter(|&i| {
            (i > 0 && pooled[i - 1] == pooled[i])
                || (i + 1 < pooled.len() && pooled[i + 1] == pooled[i])
        })
        .count();
    tied as f64 / pooled.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, values: &[f64]) -> GroupData {
        GroupData::from_values(name, values.to_vec()).unwrap()
    }

    fn range(lo: i32, hi: i32) -> Vec<f64> {
        (lo..=hi).map(f64::from).collect()
    }

    #[test]
    fn test_identical_small_samples() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r = mann_whitney_u_test(&raw("a", &values), &raw("b", &values)).unwrap();
        assert!(r.p_value >= 0.9);
        // n = 5 is below the default rank-based minimum.
        assert_eq!(
            r.mode,
            TestMode::Approximate {
                reason: ApproximationReason::SmallSample
            }
        );
    }

    #[test]
    fn test_identical_samples_rank_based() {
        let values = range(1, 10);
        let r = mann_whitney_u_test(&raw("a", &values), &raw("b", &values)).unwrap();
        assert_eq!(r.mode, TestMode::Exact);
        // U₁ = U₂ = 50 = n₁n₂/2
        assert_eq!(r.statistic, 50.0);
        assert!(r.p_value >= 0.9);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::NotApplicable);
    }

    #[test]
    fn test_complete_separation() {
        let a = raw("a", &range(1, 10));
        let b = raw("b", &range(11, 20));
        let r = mann_whitney_u_test(&a, &b).unwrap();
        assert_eq!(r.statistic, 0.0);
        // σ² = 100·21/12 = 175, z = −50/√175
        let z = -50.0 / 175.0_f64.sqrt();
        assert!((r.effect_size.unwrap() - z.abs() / 20.0_f64.sqrt()).abs() < 1e-12);
        assert!(r.p_value < 0.001);
        assert!(r.is_significant());

        // U is symmetric in group order.
        let swapped = mann_whitney_u_test(&b, &a).unwrap();
        assert_eq!(swapped.statistic, r.statistic);
        assert_eq!(swapped.p_value, r.p_value);
    }

    #[test]
    fn test_all_values_tied() {
        let a = raw("a", &[3.0; 8]);
        let b = raw("b", &[3.0; 8]);
        let r = mann_whitney_u_test(&a, &b).unwrap();
        assert_eq!(r.mode, TestMode::Exact);
        assert_eq!(r.statistic, 32.0);
        assert_eq!(r.p_value, 1.0);
        assert!(!r.recommendations.is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let a = raw("a", &[1.0, 2.0, 3.0]);
        let b = raw("b", &[4.0, 5.0, 6.0]);
        let cfg = TestConfig {
            exact_rank_min_group_size: 3,
            ..TestConfig::default()
        };
        let r = mann_whitney_u_test_with(&a, &b, &cfg).unwrap();
        assert_eq!(r.mode, TestMode::Exact);
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.test_name, "Mann-Whitney U test");
    }

    #[test]
    fn test_summary_only_approximation() {
        let a = GroupData::new("a", 40, 10.0, 4.0);
        let b = GroupData::new("b", 40, 12.0, 4.0);
        let r = mann_whitney_u_test(&a, &b).unwrap();
        assert!(r.interpretation.approximate);
        assert_eq!(r.test_name, "Mann-Whitney U test (approximate)");
        // z = −2 / √0.2
        let z = -2.0 / 0.2_f64.sqrt();
        assert!((r.statistic - z).abs() < 1e-12);
        assert!((r.effect_size.unwrap() - z.abs() / 80.0_f64.sqrt()).abs() < 1e-12);
        assert!(r.p_value < 0.001);
    }

    #[test]
    fn test_approximation_with_zero_spread() {
        let a = GroupData::new("a", 3, 1.0, 0.0);
        let b = GroupData::new("b", 3, 2.0, 0.0);
        let r = mann_whitney_u_test(&a, &b).unwrap();
        assert_eq!(r.statistic, f64::NEG_INFINITY);
        assert_eq!(r.p_value, 0.0);
        assert_eq!(r.effect_size, None);

        let same = mann_whitney_u_test(&a, &a).unwrap();
        assert_eq!(same.statistic, 0.0);
        assert_eq!(same.p_value, 1.0);
    }

    #[test]
    fn test_tied_share() {
        assert_eq!(tied_share(&[1.0, 2.0], &[3.0, 4.0]), 0.0);
        assert_eq!(tied_share(&[1.0, 2.0], &[2.0, 4.0]), 0.5);
    }
}
