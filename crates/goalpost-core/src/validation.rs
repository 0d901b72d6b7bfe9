//! Input validation for store writes.
//!
//! Views may validate too, but the store applies these checks itself so the
//! core stays safe regardless of who calls it.

use crate::error::ValidationError;
use crate::model::NewGoal;

/// Check a new progress value for a goal with the given target.
///
/// `max_progress_ratio` caps the value at `target * ratio` when set.
pub fn validate_progress(
    value: f64,
    target: f64,
    max_progress_ratio: Option<f64>,
) -> Result<(), ValidationError> {
    non_negative("current value", value)?;
    if let Some(ratio) = max_progress_ratio {
        let max = target * ratio;
        if value > max {
            return Err(ValidationError::AboveCap { value, max });
        }
    }
    Ok(())
}

/// Check a creation payload.
pub fn validate_new_goal(goal: &NewGoal) -> Result<(), ValidationError> {
    if goal.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if !goal.target_value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "target value",
            value: goal.target_value,
        });
    }
    if goal.target_value <= 0.0 {
        return Err(ValidationError::NonPositiveTarget(goal.target_value));
    }
    non_negative("current value", goal.current_value)
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}
