//! One-way ANOVA F-test from group summaries.

use tracing::debug;

use super::{strings, Effect, Findings};
use crate::config::TestConfig;
use crate::distributions::f_survival;
use crate::error::{StatsError, StatsResult};
use crate::group::GroupData;
use crate::guards::{check_finite, validate_group_inputs};
use crate::result::{DegreesOfFreedom, EffectScale, StatisticalTestResult, TestMode};

/// Between- and within-group sums of squares of a set of groups.
pub(super) struct SumsOfSquares {
    pub between: f64,
    pub within: f64,
    pub total_count: usize,
}

impl SumsOfSquares {
    pub(super) fn of(groups: &[GroupData]) -> Self {
        let total_count: usize = groups.iter().map(|g| g.count).sum();
        let within = groups
            .iter()
            .map(|g| (g.count as f64 - 1.0) * g.variance)
            .sum();

        // Equal means give exactly zero, not a rounding residue of the
        // weighted grand mean.
        let first_mean = groups.first().map_or(0.0, |g| g.mean);
        let between = if groups.iter().all(|g| g.mean == first_mean) {
            0.0
        } else {
            let n = total_count as f64;
            let grand_mean = groups.iter().map(|g| g.count as f64 * g.mean).sum::<f64>() / n;
            groups
                .iter()
                .map(|g| g.count as f64 * (g.mean - grand_mean).powi(2))
                .sum()
        };

        Self {
            between,
            within,
            total_count,
        }
    }
}

/// One-way analysis of variance with default configuration.
///
/// See [`anova_f_test_with`].
///
/// # Examples
/// ```
/// use u_inference::{anova_f_test, GroupData};
/// let groups = [
///     GroupData::new("A", 5, 10.0, 4.0),
///     GroupData::new("B", 5, 20.0, 4.0),
///     GroupData::new("C", 5, 30.0, 4.0),
/// ];
/// let r = anova_f_test(&groups).unwrap();
/// assert!((r.statistic - 125.0).abs() < 1e-9);
/// assert!(r.p_value < 1e-6);
/// ```
pub fn anova_f_test(groups: &[GroupData]) -> StatsResult<StatisticalTestResult> {
    anova_f_test_with(groups, &TestConfig::default())
}

/// One-way analysis of variance.
///
/// Uses only `count`, `mean`, and `variance` of each group.
///
/// ```text
/// SSB = Σ nᵢ(x̄ᵢ − x̄)²    dfB = k − 1
/// SSW = Σ (nᵢ − 1)sᵢ²    dfW = N − k
/// F   = (SSB/dfB) / (SSW/dfW),  p = P(F_{dfB,dfW} > F),  η² = SSB / (SSB + SSW)
/// ```
///
/// With zero within-group variance the F ratio is undefined: distinct means
/// give `F = +∞, p = 0`, identical means give `F = NaN, p = 1`.
///
/// # Errors
/// - [`StatsError::Validation`] for invalid groups or `N ≤ k`
/// - [`StatsError::NumericalInstability`] if a regular F ratio is not finite
pub fn anova_f_test_with(
    groups: &[GroupData],
    config: &TestConfig,
) -> StatsResult<StatisticalTestResult> {
    config.validate()?;
    validate_group_inputs(groups)?;

    let k = groups.len();
    let ss = SumsOfSquares::of(groups);
    if ss.total_count <= k {
        return Err(StatsError::validation(format!(
            "ANOVA needs more observations than groups (N = {}, k = {k})",
            ss.total_count
        )));
    }

    let df_between = (k - 1) as f64;
    let df_within = (ss.total_count - k) as f64;
    let ms_between = ss.between / df_between;
    let ms_within = ss.within / df_within;

    let mut recommendations = Vec::new();
    let (statistic, p_value) = if ms_within == 0.0 {
        recommendations.push(
            "Every group has zero variance; check for constant or pre-aggregated data".to_string(),
        );
        if ss.between == 0.0 {
            debug!("ANOVA: all groups constant and equal");
            (f64::NAN, 1.0)
        } else {
            debug!("ANOVA: zero within-group variance with distinct means");
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = check_finite(ms_between / ms_within, "ANOVA F-statistic")?;
        (f, f_survival(f, df_between, df_within)?)
    };

    let ss_total = ss.between + ss.within;
    let eta_squared = (ss_total > 0.0).then(|| ss.between / ss_total);

    if p_value < config.significance_level && k > 2 {
        recommendations.push(
            "Run post-hoc pairwise comparisons (e.g. Tukey HSD) to locate the differing groups"
                .to_string(),
        );
    }
    if variance_ratio(groups) > 4.0 {
        recommendations.push(
            "Group variances differ by more than 4x; consider Welch's t-test or Kruskal-Wallis"
                .to_string(),
        );
    }
    if groups.iter().any(|g| g.count < 5) {
        recommendations
            .push("Some groups have fewer than 5 observations; consider Kruskal-Wallis".to_string());
    }

    debug!(
        f = statistic,
        p = p_value,
        df_between,
        df_within,
        "ANOVA F-test computed"
    );

    Ok(Findings {
        test_name: "One-way ANOVA",
        statistic_label: "F",
        statistic,
        p_value,
        degrees_of_freedom: DegreesOfFreedom::Pair(df_between, df_within),
        effect: eta_squared.map(|value| Effect {
            value,
            scale: EffectScale::VarianceExplained,
            label: "η²",
        }),
        mode: TestMode::Exact,
        significant_finding: format!("Group means differ significantly across {k} groups"),
        null_finding: format!("No significant difference between the means of {k} groups"),
        assumptions: strings(&[
            "Observations are independent within and across groups",
            "Each group is approximately normally distributed",
            "Group variances are approximately equal",
        ]),
        recommendations,
    }
    .into_result(config))
}

/// Largest over smallest positive group variance; 1 if fewer than two are positive.
fn variance_ratio(groups: &[GroupData]) -> f64 {
    let positive = groups.iter().map(|g| g.variance).filter(|&v| v > 0.0);
    let (min, max) = positive.fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && min > 0.0 {
        max / min
    } else {
        1.0
    }
}
