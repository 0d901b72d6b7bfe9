//! The `goalpost add` command.

use anyhow::Result;

use goalpost_core::model::NewGoal;

use super::{print_summary, Session};
use crate::SessionArgs;

pub async fn execute(args: SessionArgs, new_goal: NewGoal) -> Result<()> {
    if new_goal.end_date < new_goal.start_date {
        eprintln!(
            "Warning: end date {} is before start date {}",
            new_goal.end_date, new_goal.start_date
        );
    }

    let session = Session::open(&args).await?;
    let goal = session.store.add_goal(new_goal).await?;

    println!(
        "Created {}: {} ({} / {} {})",
        goal.id, goal.title, goal.current_value, goal.target_value, goal.unit
    );
    println!();
    print_summary(&session.store.summary());

    Ok(())
}
