//! Precondition and postcondition checks shared by the hypothesis tests.

use crate::error::{StatsError, StatsResult};
use crate::group::GroupData;

/// Validates a set of groups before any statistic is computed.
///
/// # Errors
/// [`StatsError::Validation`] if there are fewer than 2 groups, or any group
/// has `count < 1`, a negative or non-finite variance, a non-finite mean, or
/// attached `values` whose length differs from `count` or that contain a
/// non-finite number.
///
/// # Examples
/// ```
/// use u_inference::{guards::validate_group_inputs, GroupData};
/// let ok = [GroupData::new("a", 3, 1.0, 0.5), GroupData::new("b", 3, 2.0, 0.5)];
/// assert!(validate_group_inputs(&ok).is_ok());
/// assert!(validate_group_inputs(&ok[..1]).is_err());
/// ```
pub fn validate_group_inputs(groups: &[GroupData]) -> StatsResult<()> {
    if groups.len() < 2 {
        return Err(StatsError::validation(format!(
            "at least 2 groups are required, got {}",
            groups.len()
        )));
    }
    groups.iter().try_for_each(validate_group)
}

/// Validates a single group's summary and attached values.
///
/// # Errors
/// [`StatsError::Validation`] under the per-group conditions of
/// [`validate_group_inputs`].
pub fn validate_group(g: &GroupData) -> StatsResult<()> {
    if g.count < 1 {
        return Err(StatsError::validation(format!(
            "group '{}' has no observations",
            g.name
        )));
    }
    if !g.mean.is_finite() {
        return Err(StatsError::validation(format!(
            "group '{}' has non-finite mean {}",
            g.name, g.mean
        )));
    }
    if !g.variance.is_finite() || g.variance < 0.0 {
        return Err(StatsError::validation(format!(
            "group '{}' has invalid variance {}",
            g.name, g.variance
        )));
    }
    if let Some(values) = &g.values {
        if values.len() != g.count {
            return Err(StatsError::validation(format!(
                "group '{}' declares {} observations but carries {} values",
                g.name,
                g.count,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StatsError::validation(format!(
                "group '{}' contains non-finite values",
                g.name
            )));
        }
    }
    Ok(())
}

/// Passes `value` through if it is finite.
///
/// # Errors
/// [`StatsError::NumericalInstability`] carrying `context` if `value` is NaN
/// or infinite.
///
/// # Examples
/// ```
/// use u_inference::guards::check_finite;
/// assert_eq!(check_finite(2.5, "t-statistic").unwrap(), 2.5);
/// assert!(check_finite(f64::NAN, "t-statistic").is_err());
/// ```
pub fn check_finite(value: f64, context: &str) -> StatsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatsError::NumericalInstability {
            context: context.to_string(),
            value,
        })
    }
}
