//! The `goalpost goals` command.

use anyhow::Result;
use comfy_table::Table;

use goalpost_core::model::Goal;
use goalpost_core::query::GoalQuery;

use super::Session;
use crate::SessionArgs;

pub async fn execute(
    args: SessionArgs,
    search: Option<String>,
    category: Option<String>,
    recent: Option<usize>,
) -> Result<()> {
    let session = Session::open(&args).await?;
    let store = &session.store;

    let query = GoalQuery { search, category };
    let mut goals = store.find(&query);
    if let Some(n) = recent {
        goals.truncate(n);
    }

    if goals.is_empty() {
        if store.goals().is_empty() {
            println!("No goals yet. Create one with `goalpost add`.");
        } else {
            println!("No goals match the filters.");
            println!("Categories: {}", store.categories().join(", "));
        }
        return Ok(());
    }

    println!("{}", goal_table(&goals));
    println!("\n{} of {} goal(s) shown", goals.len(), store.goals().len());

    Ok(())
}

fn goal_table(goals: &[Goal]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Title", "Category", "Progress", "Complete", "Window", "Status",
    ]);
    for goal in goals {
        let status = if goal.is_completed() {
            "completed"
        } else {
            "in progress"
        };
        table.add_row(vec![
            goal.id.clone(),
            goal.title.clone(),
            goal.category.clone(),
            format!("{} / {} {}", goal.current_value, goal.target_value, goal.unit),
            format!("{:.1}%", goal.completion_percent()),
            format!("{} to {}", goal.start_date, goal.end_date),
            status.to_string(),
        ]);
    }
    table
}
