//! Filtering helpers over a goal collection.

use crate::model::Goal;

/// Search and category filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalQuery {
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
}

impl GoalQuery {
    pub fn matches(&self, goal: &Goal) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !goal.title.to_lowercase().contains(&term)
                && !goal.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        match &self.category {
            Some(category) => &goal.category == category,
            None => true,
        }
    }

    /// Matching goals, in collection order.
    pub fn apply<'a>(&self, goals: &'a [Goal]) -> Vec<&'a Goal> {
        goals.iter().filter(|g| self.matches(g)).collect()
    }
}

/// Unique categories in first-seen order.
pub fn categories(goals: &[Goal]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for goal in goals {
        if !seen.contains(&goal.category) {
            seen.push(goal.category.clone());
        }
    }
    seen
}
