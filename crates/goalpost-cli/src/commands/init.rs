//! The `goalpost init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("goalpost.toml").exists() {
        println!("goalpost.toml already exists, skipping.");
    } else {
        std::fs::write("goalpost.toml", SAMPLE_CONFIG)?;
        println!("Created goalpost.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point [gateway] at your backend, or keep the demo mock");
    println!("  2. Run: goalpost summary");
    println!("  3. Run: goalpost update goal-3=20");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# goalpost configuration

[gateway]
type = "mock"
simulate_latency = false
seed = true

# [gateway]
# type = "http"
# base_url = "${GOALPOST_API_URL}"
# timeout_secs = 30

[store]
guard_concurrent_updates = true
# max_progress_ratio = 1.5
"#;
