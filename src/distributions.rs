//! Distribution functions for test statistics.
//!
//! CDFs and survival functions of the F, chi-squared, and Student-t
//! distributions, expressed through the regularized incomplete beta and
//! gamma functions in [`crate::special`].
//!
//! # Tail conventions
//!
//! | Function | `x ≤ 0` | `x = +∞` |
//! |---|---|---|
//! | [`f_cdf`], [`chi_squared_cdf`] | 0 | 1 |
//! | [`f_survival`], [`chi_squared_survival`] | 1 | 0 |
//!
//! Right-tail p-values must come from the survival functions, never from
//! `1 − cdf`, to avoid catastrophic cancellation for small p.

use crate::error::{StatsError, StatsResult};
use crate::special::{incomplete_beta, incomplete_gamma, incomplete_gamma_upper};

fn check_df(function: &'static str, name: &str, df: f64) -> StatsResult<()> {
    if !(df > 0.0 && df.is_finite()) {
        return Err(StatsError::domain(
            function,
            format!("{name} must be finite and positive, got {df}"),
        ));
    }
    Ok(())
}

fn check_not_nan(function: &'static str, x: f64) -> StatsResult<()> {
    if x.is_nan() {
        return Err(StatsError::domain(function, "argument is NaN"));
    }
    Ok(())
}

// ============================================================================
// F-Distribution
// ============================================================================

/// CDF of the F-distribution: P(X ≤ f | df1, df2).
///
/// ```text
/// F(f; d1, d2) = I(d1/2, d2/2, d1·f / (d2 + d1·f))
/// ```
///
/// # Errors
/// [`StatsError::Domain`] for NaN `f` or non-positive degrees of freedom.
///
/// # Examples
/// ```
/// use u_inference::distributions::f_cdf;
/// assert_eq!(f_cdf(0.0, 5.0, 10.0).unwrap(), 0.0);
/// assert_eq!(f_cdf(f64::INFINITY, 5.0, 10.0).unwrap(), 1.0);
/// ```
pub fn f_cdf(f: f64, df1: f64, df2: f64) -> StatsResult<f64> {
    check_not_nan("f_cdf", f)?;
    check_df("f_cdf", "df1", df1)?;
    check_df("f_cdf", "df2", df2)?;
    if f <= 0.0 {
        return Ok(0.0);
    }
    if !f.is_finite() {
        return Ok(1.0);
    }
    let x = df1 * f / (df2 + df1 * f);
    incomplete_beta(df1 / 2.0, df2 / 2.0, x)
}

/// Survival function of the F-distribution: P(X > f | df1, df2).
///
/// ```text
/// S(f; d1, d2) = I(d2/2, d1/2, d2 / (d2 + d1·f))
/// ```
///
/// # Errors
/// [`StatsError::Domain`] for NaN `f` or non-positive degrees of freedom;
/// [`StatsError::Convergence`] from the incomplete beta.
///
/// # Examples
/// ```
/// use u_inference::distributions::f_survival;
/// assert_eq!(f_survival(0.0, 2.0, 12.0).unwrap(), 1.0);
/// // Critical value F(0.95; 2, 12) = 3.885
/// assert!((f_survival(3.885, 2.0, 12.0).unwrap() - 0.05).abs() < 1e-3);
/// ```
pub fn f_survival(f: f64, df1: f64, df2: f64) -> StatsResult<f64> {
    check_not_nan("f_survival", f)?;
    check_df("f_survival", "df1", df1)?;
    check_df("f_survival", "df2", df2)?;
    if f <= 0.0 {
        return Ok(1.0);
    }
    if !f.is_finite() {
        return Ok(0.0);
    }
    let x = df2 / (df2 + df1 * f);
    incomplete_beta(df2 / 2.0, df1 / 2.0, x)
}

// ============================================================================
// Chi-Squared Distribution
// ============================================================================

/// CDF of the chi-squared distribution: P(X ≤ x | df) = P(df/2, x/2).
///
/// # Errors
/// [`StatsError::Domain`] for NaN `x` or non-positive `df`;
/// [`StatsError::Convergence`] from the incomplete gamma.
///
/// # Examples
/// ```
/// use u_inference::distributions::chi_squared_cdf;
/// assert_eq!(chi_squared_cdf(0.0, 5.0).unwrap(), 0.0);
/// assert!((chi_squared_cdf(3.841, 1.0).unwrap() - 0.95).abs() < 1e-3);
/// ```
pub fn chi_squared_cdf(x: f64, df: f64) -> StatsResult<f64> {
    check_not_nan("chi_squared_cdf", x)?;
    check_df("chi_squared_cdf", "df", df)?;
    if x <= 0.0 {
        return Ok(0.0);
    }
    incomplete_gamma(df / 2.0, x / 2.0)
}

/// Survival function of the chi-squared distribution: P(X > x | df).
///
/// Equal to `1 − P(df/2, x/2)`; for `x/2 ≥ df/2 + 1` the upper tail comes
/// straight from the continued fraction.
///
/// # Examples
/// ```
/// use u_inference::distributions::chi_squared_survival;
/// assert_eq!(chi_squared_survival(0.0, 3.0).unwrap(), 1.0);
/// assert!((chi_squared_survival(5.991, 2.0).unwrap() - 0.05).abs() < 1e-3);
/// ```
pub fn chi_squared_survival(x: f64, df: f64) -> StatsResult<f64> {
    check_not_nan("chi_squared_survival", x)?;
    check_df("chi_squared_survival", "df", df)?;
    if x <= 0.0 {
        return Ok(1.0);
    }
    incomplete_gamma_upper(df / 2.0, x / 2.0)
}

// ============================================================================
// Student's t-Distribution
// ============================================================================

/// CDF of Student's t-distribution: P(T ≤ t | df).
///
/// # Algorithm
/// With `x = df / (df + t²)`:
/// - `t ≥ 0`: `F(t) = 1 − I(df/2, 1/2, x) / 2`
/// - `t < 0`: `F(t) = I(df/2, 1/2, x) / 2`
///
/// # Examples
/// ```
/// use u_inference::distributions::t_cdf;
/// assert!((t_cdf(0.0, 10.0).unwrap() - 0.5).abs() < 1e-12);
/// assert!((t_cdf(-2.228, 10.0).unwrap() - 0.025).abs() < 1e-3);
/// ```
pub fn t_cdf(t: f64, df: f64) -> StatsResult<f64> {
    check_not_nan("t_cdf", t)?;
    check_df("t_cdf", "df", df)?;
    if t == 0.0 {
        return Ok(0.5);
    }
    if t.is_infinite() {
        return Ok(if t > 0.0 { 1.0 } else { 0.0 });
    }
    let x = df / (df + t * t);
    let ib = incomplete_beta(df / 2.0, 0.5, x)?;
    Ok(if t > 0.0 { 1.0 - ib / 2.0 } else { ib / 2.0 })
}
