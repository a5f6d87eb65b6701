//! Welch's unequal-variance t-test.

use tracing::debug;

use super::{clamp_probability, strings, two_tailed_normal_p, Effect, Findings};
use crate::config::{TestConfig, WelchPValue};
use crate::distributions::t_cdf;
use crate::error::{StatsError, StatsResult};
use crate::group::GroupData;
use crate::guards::{check_finite, validate_group};
use crate::result::{DegreesOfFreedom, EffectScale, StatisticalTestResult, TestMode};

/// Welch's t-test with default configuration.
///
/// See [`welchs_t_test_with`].
///
/// # Examples
/// ```
/// use u_inference::{welchs_t_test, GroupData};
/// let a = GroupData::new("control", 30, 10.0, 4.0);
/// let b = GroupData::new("treatment", 30, 10.0, 4.0);
/// let r = welchs_t_test(&a, &b).unwrap();
/// assert_eq!(r.statistic, 0.0);
/// assert!(r.p_value > 0.999);
/// ```
pub fn welchs_t_test(
    group1: &GroupData,
    group2: &GroupData,
) -> StatsResult<StatisticalTestResult> {
    welchs_t_test_with(group1, group2, &TestConfig::default())
}

/// Welch's t-test for two groups with possibly unequal variances.
///
/// ```text
/// t  = (x̄₁ − x̄₂) / √(s₁²/n₁ + s₂²/n₂)
/// df = (s₁²/n₁ + s₂²/n₂)² / ((s₁²/n₁)²/(n₁−1) + (s₂²/n₂)²/(n₂−1))
/// d  = (x̄₁ − x̄₂) / √(((n₁−1)s₁² + (n₂−1)s₂²) / (n₁+n₂−2))
/// ```
///
/// The p-value is two-tailed. [`WelchPValue::NormalApproximation`] (the
/// default) uses the standard normal tail; [`WelchPValue::StudentT`] uses the
/// t-distribution at `df`.
///
/// With zero standard error, equal means give `t = 0, p = 1` and distinct
/// means `t = +∞, p = 0`; `df` is then reported as `n₁ + n₂ − 2`.
///
/// # Errors
/// - [`StatsError::Validation`] for invalid groups or a group with fewer
///   than 2 observations
/// - [`StatsError::NumericalInstability`] if t or df is not finite
pub fn welchs_t_test_with(
    group1: &GroupData,
    group2: &GroupData,
    config: &TestConfig,
) -> StatsResult<StatisticalTestResult> {
    config.validate()?;
    for g in [group1, group2] {
        validate_group(g)?;
        if g.count < 2 {
            return Err(StatsError::validation(format!(
                "Welch's t-test needs at least 2 observations per group; '{}' has {}",
                g.name, g.count
            )));
        }
    }

    let n1 = group1.count as f64;
    let n2 = group2.count as f64;
    let se1 = group1.variance / n1;
    let se2 = group2.variance / n2;
    let diff = group1.mean - group2.mean;
    let standard_error = (se1 + se2).sqrt();

    let (statistic, df, p_value) = if standard_error == 0.0 {
        debug!("Welch: zero standard error");
        let df = n1 + n2 - 2.0;
        if diff == 0.0 {
            (0.0, df, 1.0)
        } else {
            (f64::INFINITY, df, 0.0)
        }
    } else {
        let t = check_finite(diff / standard_error, "Welch t-statistic")?;
        // Satterthwaite on the shares of se₁ + se₂, so tiny variances cannot underflow.
        let (r1, r2) = (se1 / (se1 + se2), se2 / (se1 + se2));
        let df = check_finite(
            1.0 / (r1 * r1 / (n1 - 1.0) + r2 * r2 / (n2 - 1.0)),
            "Welch-Satterthwaite degrees of freedom",
        )?;
        let p = match config.welch_p_value {
            WelchPValue::NormalApproximation => two_tailed_normal_p(t),
            // 2·P(T ≤ −|t|) keeps precision in the far tail.
            WelchPValue::StudentT => clamp_probability(2.0 * t_cdf(-t.abs(), df)?),
        };
        (t, df, p)
    };

    let pooled_sd = (((n1 - 1.0) * group1.variance + (n2 - 1.0) * group2.variance)
        / (n1 + n2 - 2.0))
        .sqrt();
    let cohens_d = if pooled_sd > 0.0 {
        Some(diff / pooled_sd)
    } else if diff == 0.0 {
        Some(0.0)
    } else {
        None
    };

    debug!(t = statistic, df, p = p_value, "Welch's t-test computed");

    let mut recommendations = Vec::new();
    if config.welch_p_value == WelchPValue::NormalApproximation && df < 30.0 {
        recommendations.push(format!(
            "Degrees of freedom are small (df = {df:.1}); the normal p-value is optimistic, \
             consider the Student-t p-value"
        ));
    }
    if n1 < 15.0 || n2 < 15.0 {
        recommendations.push(
            "Small groups are sensitive to non-normality; check with Anderson-Darling or use \
             Mann-Whitney U"
                .to_string(),
        );
    }

    Ok(Findings {
        test_name: "Welch's t-test",
        statistic_label: "t",
        statistic,
        p_value,
        degrees_of_freedom: DegreesOfFreedom::Single(df),
        effect: cohens_d.map(|value| Effect {
            value,
            scale: EffectScale::StandardizedMeanDifference,
            label: "d",
        }),
        mode: TestMode::Exact,
        significant_finding: format!(
            "Means of '{}' and '{}' differ significantly",
            group1.name, group2.name
        ),
        null_finding: format!(
            "No significant difference between the means of '{}' and '{}'",
            group1.name, group2.name
        ),
        assumptions: strings(&[
            "Observations are independent within and across groups",
            "Each group is approximately normally distributed, or large enough for the CLT",
        ]),
        recommendations,
    }
    .into_result(config))
}
