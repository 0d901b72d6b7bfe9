//! The `goalpost update` command.

use anyhow::{Context, Result};
use futures::future::join_all;

use super::{print_summary, Session};
use crate::SessionArgs;

pub async fn execute(args: SessionArgs, assignments: Vec<String>) -> Result<()> {
    let updates = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;

    let session = Session::open(&args).await?;
    let store = &session.store;

    // Updates run concurrently. A repeated id is only rejected while an earlier
    // update of it is still waiting on the gateway.
    let results = join_all(
        updates
            .iter()
            .map(|(goal_id, value)| store.update_goal_progress(goal_id, *value)),
    )
    .await;

    let mut failed = 0;
    for ((goal_id, value), result) in updates.iter().zip(results) {
        match result {
            Ok(()) => println!("Updated {goal_id} to {value}"),
            Err(e) => {
                eprintln!("Failed to update {goal_id}: {e}");
                failed += 1;
            }
        }
    }

    println!();
    print_summary(&store.summary());

    anyhow::ensure!(failed == 0, "{failed} update(s) failed");
    Ok(())
}

/// Parse `GOAL_ID=VALUE`.
fn parse_assignment(s: &str) -> Result<(String, f64)> {
    let (goal_id, value) = s
        .split_once('=')
        .with_context(|| format!("expected GOAL_ID=VALUE, got '{s}'"))?;
    let goal_id = goal_id.trim();
    anyhow::ensure!(!goal_id.is_empty(), "missing goal id in '{s}'");
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid progress value in '{s}'"))?;
    Ok((goal_id.to_string(), value))
}
