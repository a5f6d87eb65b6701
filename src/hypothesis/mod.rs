//! Classical hypothesis tests.
//!
//! Every test follows the same pipeline: validate the input, compute the
//! statistic, map it to a p-value through [`crate::distributions`], derive an
//! effect size, and package everything into a [`StatisticalTestResult`].
//!
//! | Test | Input | Statistic | p-value | Effect size |
//! |---|---|---|---|---|
//! | [`anova_f_test`] | ≥ 2 groups | F | F survival | η² |
//! | [`kruskal_wallis_test`] | ≥ 2 groups | H (tie-corrected) | χ² survival | ε² |
//! | [`welchs_t_test`] | 2 groups | t | normal, two-tailed | Cohen's d |
//! | [`mann_whitney_u_test`] | 2 groups | U | normal, two-tailed | r |
//! | [`anderson_darling_test`] | raw sample | A² | piecewise fit | none |
//!
//! Kruskal-Wallis and Mann-Whitney need raw values for their rank-based
//! path. Without them they run a summary-statistic approximation and say so
//! through [`TestMode::Approximate`], an "(approximate)" suffix on the test
//! name, and `interpretation.approximate`.

mod anderson_darling;
mod anova;
mod kruskal_wallis;
mod mann_whitney;
mod welch;

pub use anderson_darling::{anderson_darling_test, anderson_darling_test_with};
pub use anova::{anova_f_test, anova_f_test_with};
pub use kruskal_wallis::{kruskal_wallis_test, kruskal_wallis_test_with};
pub use mann_whitney::{mann_whitney_u_test, mann_whitney_u_test_with};
pub use welch::{welchs_t_test, welchs_t_test_with};

use crate::config::TestConfig;
use crate::result::{
    DegreesOfFreedom, EffectScale, Interpretation, StatisticalTestResult, TestMode,
};
use crate::special::standard_normal_cdf;

/// Two-tailed p-value of a standard normal statistic, `2(1 − Φ(|z|))`.
///
/// `z = 0` maps to 1 and infinite `z` to 0. The erf approximation behind Φ
/// is off by about 1e-9 elsewhere, so the result is clamped into `[0, 1]`.
pub(crate) fn two_tailed_normal_p(z: f64) -> f64 {
    if z == 0.0 {
        return 1.0;
    }
    if z.is_infinite() {
        return 0.0;
    }
    clamp_probability(2.0 * (1.0 - standard_normal_cdf(z.abs())))
}

pub(crate) fn clamp_probability(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// An effect size together with how to label it.
pub(crate) struct Effect {
    pub value: f64,
    pub scale: EffectScale,
    pub label: &'static str,
}

/// Everything a test computed, before interpretation.
pub(crate) struct Findings {
    pub test_name: &'static str,
    pub statistic_label: &'static str,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: DegreesOfFreedom,
    pub effect: Option<Effect>,
    pub mode: TestMode,
    /// Headline when `p < α`.
    pub significant_finding: String,
    /// Headline otherwise.
    pub null_finding: String,
    pub assumptions: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Findings {
    pub(crate) fn into_result(self, config: &TestConfig) -> StatisticalTestResult {
        let alpha = config.significance_level;
        let p_value = clamp_probability(self.p_value);
        let significant = p_value < alpha;
        let approximate = self.mode.is_approximate();

        let effect_magnitude = self
            .effect
            .as_ref()
            .and_then(|e| e.scale.classify(e.value));

        let mut summary = format!(
            "{} ({} = {}, {}).",
            if significant {
                &self.significant_finding
            } else {
                &self.null_finding
            },
            self.statistic_label,
            format_statistic(self.statistic),
            format_p(p_value),
        );
        if let (Some(effect), Some(magnitude)) = (&self.effect, effect_magnitude) {
            summary.push_str(&format!(
                " Effect size {} = {:.3} ({}).",
                effect.label,
                effect.value,
                magnitude_word(magnitude)
            ));
        }
        let mut recommendations = self.recommendations;
        if let TestMode::Approximate { reason } = self.mode {
            summary.push_str(&format!(
                " Approximate result: {}; treat the p-value as indicative only.",
                reason.describe()
            ));
            recommendations.push(reason.remedy().to_string());
        }

        let test_name = if approximate {
            format!("{} (approximate)", self.test_name)
        } else {
            self.test_name.to_string()
        };

        StatisticalTestResult {
            test_name,
            statistic: self.statistic,
            p_value,
            degrees_of_freedom: self.degrees_of_freedom,
            effect_size: self.effect.map(|e| e.value),
            interpretation: Interpretation {
                summary,
                significant,
                significance_level: alpha,
                effect_magnitude,
                approximate,
            },
            assumptions: self.assumptions,
            recommendations,
            mode: self.mode,
        }
    }
}

fn format_statistic(x: f64) -> String {
    if x.is_nan() {
        "undefined".to_string()
    } else if x == f64::INFINITY {
        "∞".to_string()
    } else {
        format!("{x:.3}")
    }
}

fn format_p(p: f64) -> String {
    if p < 0.001 {
        "p < 0.001".to_string()
    } else {
        format!("p = {p:.3}")
    }
}

fn magnitude_word(m: crate::result::EffectMagnitude) -> &'static str {
    use crate::result::EffectMagnitude::*;
    match m {
        Negligible => "negligible",
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
