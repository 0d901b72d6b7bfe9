//! Core data model types for goalpost.
//!
//! These are the types that travel between the goal store, the sync gateway,
//! and whatever renders them. Field names serialize in camelCase to match the
//! JSON shape the backend speaks.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trackable target with a numeric current/target pair and a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier, assigned by the gateway.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Value at which the goal counts as completed. Positive.
    pub target_value: f64,
    /// Progress so far. Non-negative, may exceed the target.
    pub current_value: f64,
    /// Unit label (e.g. "pages", "%", "$").
    #[serde(default)]
    pub unit: String,
    /// First day of the goal window.
    pub start_date: NaiveDate,
    /// Last day of the goal window. Expected to be on or after `start_date`.
    pub end_date: NaiveDate,
    /// Free-form category.
    #[serde(default)]
    pub category: String,
    /// Display color token (e.g. "#3B82F6").
    #[serde(default)]
    pub color: String,
}

impl Goal {
    /// Attach an id to a creation payload.
    pub fn from_new(id: impl Into<String>, new: NewGoal) -> Self {
        Self {
            id: id.into(),
            title: new.title,
            description: new.description,
            target_value: new.target_value,
            current_value: new.current_value,
            unit: new.unit,
            start_date: new.start_date,
            end_date: new.end_date,
            category: new.category,
            color: new.color,
        }
    }

    /// Completed iff the raw current value reached the target.
    ///
    /// This uses the un-clamped values, unlike [`Goal::completion_percent`].
    pub fn is_completed(&self) -> bool {
        self.current_value >= self.target_value
    }

    /// Completion percentage clamped to `[0, 100]`.
    pub fn completion_percent(&self) -> f64 {
        if self.target_value <= 0.0 || !self.target_value.is_finite() {
            return if self.is_completed() { 100.0 } else { 0.0 };
        }
        let percent = self.current_value / self.target_value * 100.0;
        if percent.is_nan() {
            return 0.0;
        }
        percent.clamp(0.0, 100.0)
    }
}

/// Payload for creating a goal: every field of [`Goal`] except the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
}

impl From<Goal> for NewGoal {
    fn from(goal: Goal) -> Self {
        Self {
            title: goal.title,
            description: goal.description,
            target_value: goal.target_value,
            current_value: goal.current_value,
            unit: goal.unit,
            start_date: goal.start_date,
            end_date: goal.end_date,
            category: goal.category,
            color: goal.color,
        }
    }
}

/// Aggregate statistics derived from the full goal collection.
///
/// Never mutated directly: build it with [`ProgressSummary::from_goals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub in_progress_goals: usize,
    /// Mean of the clamped per-goal completion percentages, in `[0, 100]`.
    pub average_completion: f64,
}

/// Acknowledgement returned by the gateway for a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: bool,
}

/// Login credentials.
///
/// Note: Custom Debug impl masks the password to keep it out of logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// The authenticated user, as returned by the gateway. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: &str, target: f64, current: f64) -> Goal {
        Goal {
            id: id.into(),
            title: format!("Goal {id}"),
            description: String::new(),
            target_value: target,
            current_value: current,
            unit: "units".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            category: "Work".into(),
            color: "#3B82F6".into(),
        }
    }

    #[test]
    fn completion_percent_clamps_overshoot() {
        assert_eq!(goal("a", 100.0, 250.0).completion_percent(), 100.0);
        assert_eq!(goal("a", 320.0, 180.0).completion_percent(), 56.25);
        assert_eq!(goal("a", 20.0, 0.0).completion_percent(), 0.0);
    }

    #[test]
    fn completed_uses_raw_values() {
        assert!(goal("a", 20.0, 20.0).is_completed());
        assert!(goal("a", 20.0, 1000.0).is_completed());
        assert!(!goal("a", 20.0, 19.999).is_completed());
    }

    #[test]
    fn degenerate_target_stays_in_range() {
        assert_eq!(goal("a", 0.0, 0.0).completion_percent(), 100.0);
        assert_eq!(goal("a", 0.0, 5.0).completion_percent(), 100.0);
        assert_eq!(goal("a", 10.0, -5.0).completion_percent(), 0.0);
    }

    #[test]
    fn goal_serializes_camel_case() {
        let json = serde_json::to_value(goal("goal-1", 100.0, 65.0)).unwrap();
        assert_eq!(json["targetValue"], 100.0);
        assert_eq!(json["currentValue"], 65.0);
        assert_eq!(json["startDate"], "2025-01-01");
        assert!(json.get("target_value").is_none());
    }

    #[test]
    fn credentials_debug_masks_password() {
        let creds = Credentials::new("demo@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("demo@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
