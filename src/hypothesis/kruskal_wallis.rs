//! Kruskal-Wallis H test for k independent groups.

use tracing::{debug, warn};

use super::anova::SumsOfSquares;
use super::{strings, Effect, Findings};
use crate::config::TestConfig;
use crate::distributions::chi_squared_survival;
use crate::error::StatsResult;
use crate::group::GroupData;
use crate::guards::{check_finite, validate_group_inputs};
use crate::rank::rank_samples;
use crate::result::{
    ApproximationReason, DegreesOfFreedom, EffectScale, StatisticalTestResult, TestMode,
};

/// Kruskal-Wallis test with default configuration.
///
/// See [`kruskal_wallis_test_with`].
pub fn kruskal_wallis_test(groups: &[GroupData]) -> StatsResult<StatisticalTestResult> {
    kruskal_wallis_test_with(groups, &TestConfig::default())
}

/// Kruskal-Wallis H test.
///
/// When every group carries raw values, all observations are pooled and
/// ranked with midranks:
///
/// ```text
/// H  = 12 / (N(N+1)) · Σ Rᵢ²/nᵢ − 3(N+1)
/// H' = H / (1 − Σ(t³ − t) / (N³ − N))
/// p  = P(χ²_{k−1} > H'),  ε² = max(0, (H' − (k−1)) / (N − 1))
/// ```
///
/// If all observations are tied, `H' = 0` and `p = 1`.
///
/// Without raw values the test is approximated from the ANOVA sums of
/// squares, `H ≈ (N − 1)·SSB / (SSB + SSW)`, and the result is flagged as
/// approximate.
///
/// # Errors
/// - [`StatsError::Validation`](crate::StatsError::Validation) for invalid groups
/// - [`StatsError::NumericalInstability`](crate::StatsError::NumericalInstability)
///   if H is not finite
///
/// # Examples
/// ```
/// use u_inference::{kruskal_wallis_test, GroupData};
/// let a = GroupData::from_values("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let b = GroupData::from_values("b", vec![11.0, 12.0, 13.0, 14.0, 15.0]).unwrap();
/// let c = GroupData::from_values("c", vec![21.0, 22.0, 23.0, 24.0, 25.0]).unwrap();
/// let r = kruskal_wallis_test(&[a, b, c]).unwrap();
/// assert!(r.p_value < 0.01);
/// assert!(!r.mode.is_approximate());
/// ```
pub fn kruskal_wallis_test_with(
    groups: &[GroupData],
    config: &TestConfig,
) -> StatsResult<StatisticalTestResult> {
    config.validate()?;
    validate_group_inputs(groups)?;

    let k = groups.len();
    let df = (k - 1) as f64;
    let samples: Option<Vec<&[f64]>> = groups.iter().map(|g| g.values.as_deref()).collect();

    let (statistic, p_value, epsilon_squared, mode) = match samples {
        Some(samples) => {
            let (h, p, eps) = ranked_statistic(groups, &samples, df)?;
            (h, p, eps, TestMode::Exact)
        }
        None => {
            warn!(
                test = "kruskal_wallis",
                reason = "missing_raw_values",
                groups = k,
                "raw values missing, using sum-of-squares approximation"
            );
            let (h, p, eps) = approximate_statistic(groups, df)?;
            let mode = TestMode::Approximate {
                reason: ApproximationReason::MissingRawValues,
            };
            (h, p, eps, mode)
        }
    };

    debug!(h = statistic, p = p_value, df, "Kruskal-Wallis test computed");

    let mut recommendations = Vec::new();
    if p_value < config.significance_level && k > 2 {
        recommendations.push(
            "Run Dunn's test or pairwise Mann-Whitney U tests to locate the differing groups"
                .to_string(),
        );
    }
    if groups.iter().any(|g| g.count < 5) {
        recommendations.push(
            "Some groups have fewer than 5 observations; the chi-squared p-value is rough"
                .to_string(),
        );
    }

    Ok(Findings {
        test_name: "Kruskal-Wallis H test",
        statistic_label: "H",
        statistic,
        p_value,
        degrees_of_freedom: DegreesOfFreedom::Single(df),
        effect: Some(Effect {
            value: epsilon_squared,
            scale: EffectScale::VarianceExplained,
            label: "ε²",
        }),
        mode,
        significant_finding: format!("Distributions differ significantly across {k} groups"),
        null_finding: format!("No significant difference between the distributions of {k} groups"),
        assumptions: strings(&[
            "Observations are independent within and across groups",
            "The response is at least ordinal",
            "Group distributions have similar shapes when comparing medians",
        ]),
        recommendations,
    }
    .into_result(config))
}

/// Returns `(H', p, ε²)` from pooled midranks.
fn ranked_statistic(
    groups: &[GroupData],
    samples: &[&[f64]],
    df: f64,
) -> StatsResult<(f64, f64, f64)> {
    let ranks = rank_samples(samples);
    let n = ranks.total as f64;

    let weighted: f64 = ranks
        .rank_sums
        .iter()
        .zip(groups)
        .map(|(r, g)| r * r / g.count as f64)
        .sum();
    let h = 12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0);

    let tie_denominator = 1.0 - ranks.tie_term / (n * n * n - n);
    if tie_denominator <= 0.0 {
        debug!("Kruskal-Wallis: every observation is tied");
        return Ok((0.0, 1.0, 0.0));
    }

    // H is non-negative; rounding can leave a tiny negative residue.
    let h_corrected = check_finite(h / tie_denominator, "Kruskal-Wallis H")?.max(0.0);
    let p = chi_squared_survival(h_corrected, df)?;
    let epsilon_squared = ((h_corrected - df) / (n - 1.0)).max(0.0);
    Ok((h_corrected, p, epsilon_squared))
}

/// Returns `(H, p, ε²)` estimated from group summaries.
fn approximate_statistic(groups: &[GroupData], df: f64) -> StatsResult<(f64, f64, f64)> {
    let ss = SumsOfSquares::of(groups);
    let total = ss.between + ss.within;
    if total == 0.0 {
        debug!("Kruskal-Wallis: no variation in any group summary");
        return Ok((0.0, 1.0, 0.0));
    }
    let n = ss.total_count as f64;
    let h = check_finite((n - 1.0) * ss.between / total, "Kruskal-Wallis H")?;
    let p = chi_squared_survival(h, df)?;
    let epsilon_squared = if n > 1.0 {
        ((h - df) / (n - 1.0)).max(0.0)
    } else {
        0.0
    };
    Ok((h, p, epsilon_squared))
}
