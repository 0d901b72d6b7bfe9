//! The `goalpost summary` command.

use anyhow::Result;

use super::{print_summary, Session};
use crate::SessionArgs;

pub async fn execute(args: SessionArgs, format: String) -> Result<()> {
    let session = Session::open(&args).await?;
    let summary = session.store.summary();

    match format.as_str() {
        "text" => {
            if let Some(user) = session.auth.current_user() {
                println!("Progress for {} (via {})\n", user.name, session.gateway.name());
            }
            print_summary(&summary);
        }
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}
