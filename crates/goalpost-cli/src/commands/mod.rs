//! Subcommand implementations and the login flow they share.

use std::sync::Arc;

use anyhow::{Context, Result};

use goalpost_core::model::{Credentials, ProgressSummary};
use goalpost_core::traits::SyncGateway;
use goalpost_core::{AuthGate, GoalStore};
use goalpost_gateway::config::{create_gateway, load_config_from};

use crate::SessionArgs;

pub mod add;
pub mod goals;
pub mod init;
pub mod summary;
pub mod update;

/// A logged-in session with a populated goal store.
pub struct Session {
    pub gateway: Arc<dyn SyncGateway>,
    pub auth: AuthGate,
    pub store: GoalStore,
}

impl Session {
    /// Load config, log in, and let the store fetch.
    pub async fn open(args: &SessionArgs) -> Result<Self> {
        let config = load_config_from(args.config.as_deref())?;
        let gateway = create_gateway(&config.gateway)?;
        let auth = AuthGate::new();
        let store = GoalStore::new(Arc::clone(&gateway), &auth, config.store);

        auth.login(
            gateway.as_ref(),
            &Credentials::new(&args.email, &args.password),
        )
        .await
        .with_context(|| format!("login as {} failed", args.email))?;
        store
            .apply_auth_state()
            .await
            .context("failed to load goals")?;
        tracing::debug!(
            gateway = gateway.name(),
            goals = store.summary().total_goals,
            "session opened"
        );

        Ok(Self {
            gateway,
            auth,
            store,
        })
    }
}

pub fn print_summary(summary: &ProgressSummary) {
    println!("Total goals:        {}", summary.total_goals);
    println!("Completed:          {}", summary.completed_goals);
    println!("In progress:        {}", summary.in_progress_goals);
    println!("Average completion: {:.2}%", summary.average_completion);
}
