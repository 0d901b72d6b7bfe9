//! Progress summary calculation.
//!
//! A summary is a pure function of the goal collection: counts by completion
//! status and the mean clamped completion percentage.

use crate::model::{Goal, ProgressSummary};

impl ProgressSummary {
    /// Compute the summary for a collection of goals.
    ///
    /// A goal counts as completed iff its raw current value reached the
    /// target, while the average uses percentages clamped to 100. The result
    /// does not depend on the order of `goals`.
    pub fn from_goals(goals: &[Goal]) -> Self {
        let total_goals = goals.len();
        let completed_goals = goals.iter().filter(|g| g.is_completed()).count();

        Self {
            total_goals,
            completed_goals,
            in_progress_goals: total_goals - completed_goals,
            average_completion: average_completion(goals),
        }
    }

    /// Whether there is nothing to summarize.
    pub fn is_empty(&self) -> bool {
        self.total_goals == 0
    }
}

/// Mean of the clamped per-goal completion percentages, 0 for no goals.
pub fn average_completion(goals: &[Goal]) -> f64 {
    if goals.is_empty() {
        return 0.0;
    }

    // Summed in sorted order so float rounding is independent of collection order.
    let mut rates: Vec<f64> = goals.iter().map(Goal::completion_percent).collect();
    rates.sort_by(f64::total_cmp);

    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    mean.clamp(0.0, 100.0)
}
