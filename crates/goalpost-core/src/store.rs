//! The goal store: single source of truth for the signed-in user's goals.
//!
//! All writes go through the [`SyncGateway`] and only touch local state once
//! the gateway confirms them. Every change is published as a
//! [`StoreSnapshot`] on a watch channel, with the summary recomputed.
//!
//! The store follows the [`AuthGate`]: logging out clears it, logging in on an
//! empty store fetches. Responses that settle after such a reset belong to
//! the old session and are dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::auth::AuthGate;
use crate::error::{GatewayError, StoreError};
use crate::model::{Goal, NewGoal, ProgressSummary, UserProfile};
use crate::query::{self, GoalQuery};
use crate::traits::SyncGateway;
use crate::validation::{validate_new_goal, validate_progress};

/// Tunables for the goal store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Reject a progress update while another one for the same goal is
    /// outstanding. When off, the last response to arrive wins.
    #[serde(default = "default_true")]
    pub guard_concurrent_updates: bool,
    /// Upper bound for a progress value, as a multiple of the goal's target.
    #[serde(default)]
    pub max_progress_ratio: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            guard_concurrent_updates: true,
            max_progress_ratio: None,
        }
    }
}

/// What consumers see: the goals, their summary, and whether a fetch is
/// outstanding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub goals: Vec<Goal>,
    pub summary: ProgressSummary,
    pub is_loading: bool,
}

#[derive(Default)]
struct Session {
    user_id: Option<String>,
    /// Bumped on every reset; requests compare it before applying results.
    epoch: u64,
    pending_fetches: usize,
    updates_in_flight: HashSet<String>,
}

/// In-memory goal collection for the current session.
pub struct GoalStore {
    gateway: Arc<dyn SyncGateway>,
    auth: watch::Receiver<Option<UserProfile>>,
    config: StoreConfig,
    snapshot: watch::Sender<StoreSnapshot>,
    session: Mutex<Session>,
}

impl GoalStore {
    pub fn new(gateway: Arc<dyn SyncGateway>, auth: &AuthGate, config: StoreConfig) -> Self {
        let (snapshot, _) = watch::channel(StoreSnapshot::default());
        Self {
            gateway,
            auth: auth.subscribe(),
            config,
            snapshot,
            session: Mutex::new(Session::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.auth.borrow().is_some()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.snapshot.borrow().goals.clone()
    }

    pub fn summary(&self) -> ProgressSummary {
        self.snapshot.borrow().summary
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.borrow().is_loading
    }

    pub fn goal(&self, goal_id: &str) -> Option<Goal> {
        self.snapshot
            .borrow()
            .goals
            .iter()
            .find(|g| g.id == goal_id)
            .cloned()
    }

    /// Goals matching `query`, in collection order.
    pub fn find(&self, query: &GoalQuery) -> Vec<Goal> {
        let snapshot = self.snapshot.borrow();
        query.apply(&snapshot.goals).into_iter().cloned().collect()
    }

    /// Unique categories across the collection, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        query::categories(&self.snapshot.borrow().goals)
    }

    /// The first `n` goals of the collection.
    pub fn recent(&self, n: usize) -> Vec<Goal> {
        self.snapshot.borrow().goals.iter().take(n).cloned().collect()
    }

    /// Watch every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot.subscribe()
    }

    // -----------------------------------------------------------------------
    // Gateway-backed operations
    // -----------------------------------------------------------------------

    /// Replace the collection with the gateway's goals.
    ///
    /// On failure the previous goals stay in place.
    pub async fn fetch_goals(&self) -> Result<(), StoreError> {
        let epoch = self.session_epoch()?;
        let _loading = FetchGuard::begin(self, epoch);

        match self.gateway.fetch_goals().await {
            Ok(goals) => {
                let count = goals.len();
                if self.replace_goals(epoch, goals) {
                    info!(count, "fetched goals");
                } else {
                    debug!(count, "discarding goals fetched before a session reset");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "error fetching goals");
                Err(e.into())
            }
        }
    }

    /// Set the current value of a goal once the gateway confirms it.
    ///
    /// Unknown ids are rejected before anything is sent.
    pub async fn update_goal_progress(
        &self,
        goal_id: &str,
        new_value: f64,
    ) -> Result<(), StoreError> {
        let epoch = self.session_epoch()?;
        let target = self
            .snapshot
            .borrow()
            .goals
            .iter()
            .find(|g| g.id == goal_id)
            .map(|g| g.target_value)
            .ok_or_else(|| StoreError::GoalNotFound(goal_id.to_string()))?;
        validate_progress(new_value, target, self.config.max_progress_ratio)?;

        let _claim = UpdateClaim::acquire(self, goal_id, epoch)?;

        let ack = match self.gateway.update_goal(goal_id, new_value).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!(goal_id, error = %e, "error updating goal");
                return Err(e.into());
            }
        };
        if !ack.success {
            let e = GatewayError::Unavailable(format!("update of {goal_id} was not acknowledged"));
            warn!(goal_id, error = %e, "error updating goal");
            return Err(e.into());
        }

        if !self.set_current_value(epoch, goal_id, new_value) {
            debug!(goal_id, "update confirmed but goal is no longer in this session");
        }
        Ok(())
    }

    /// Create a goal through the gateway and append it.
    ///
    /// Errors propagate; the collection only changes on success.
    pub async fn add_goal(&self, new_goal: NewGoal) -> Result<Goal, StoreError> {
        let epoch = self.session_epoch()?;
        validate_new_goal(&new_goal)?;

        let goal = match self.gateway.create_goal(&new_goal).await {
            Ok(goal) => goal,
            Err(e) => {
                error!(error = %e, "error adding goal");
                return Err(e.into());
            }
        };

        if self.append_goal(epoch, goal.clone()) {
            info!(goal_id = %goal.id, "added goal");
        } else {
            debug!(goal_id = %goal.id, "created goal belongs to a reset session");
        }
        Ok(goal)
    }

    // -----------------------------------------------------------------------
    // Auth lifecycle
    // -----------------------------------------------------------------------

    /// Bring the store in line with the auth gate once.
    ///
    /// Logged out: clear everything. Logged in with an empty store and no
    /// fetch outstanding: fetch. A different user than before resets first.
    pub async fn apply_auth_state(&self) -> Result<(), StoreError> {
        let user_id = self.auth.borrow().as_ref().map(|u| u.id.clone());
        let Some(user_id) = user_id else {
            self.reset();
            return Ok(());
        };

        let should_fetch = {
            let mut session = self.lock_session();
            self.bind_user(&mut session, &user_id);
            session.pending_fetches == 0 && self.snapshot.borrow().goals.is_empty()
        };
        if should_fetch {
            self.fetch_goals().await?;
        }
        Ok(())
    }

    /// Apply the auth state now and again on every change, until the gate is
    /// dropped. Errors are logged and do not stop the loop.
    pub async fn follow_auth(&self) {
        let mut auth = self.auth.clone();
        loop {
            auth.borrow_and_update();
            if let Err(e) = self.apply_auth_state().await {
                warn!(error = %e, "failed to sync goal store with auth state");
            }
            if auth.changed().await.is_err() {
                break;
            }
        }
    }

    /// Drop all goals and zero the summary.
    pub fn reset(&self) {
        let mut session = self.lock_session();
        self.reset_locked(&mut session);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_epoch(&self) -> Result<u64, StoreError> {
        let user_id = self
            .auth
            .borrow()
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(StoreError::NotAuthenticated)?;
        let mut session = self.lock_session();
        self.bind_user(&mut session, &user_id);
        Ok(session.epoch)
    }

    fn bind_user(&self, session: &mut Session, user_id: &str) {
        if session.user_id.as_deref() == Some(user_id) {
            return;
        }
        if session.user_id.is_some() {
            self.reset_locked(session);
        }
        session.user_id = Some(user_id.to_string());
    }

    fn reset_locked(&self, session: &mut Session) {
        let had_session = session.user_id.take().is_some();
        session.epoch += 1;
        session.pending_fetches = 0;
        session.updates_in_flight.clear();

        let cleared = self.snapshot.send_if_modified(|snapshot| {
            if *snapshot == StoreSnapshot::default() {
                return false;
            }
            *snapshot = StoreSnapshot::default();
            true
        });
        if had_session || cleared {
            info!("cleared goal store");
        }
    }

    fn replace_goals(&self, epoch: u64, goals: Vec<Goal>) -> bool {
        let session = self.lock_session();
        if session.epoch != epoch {
            return false;
        }
        self.modify_goals(|current| {
            *current = goals;
            true
        });
        true
    }

    fn set_current_value(&self, epoch: u64, goal_id: &str, value: f64) -> bool {
        let session = self.lock_session();
        if session.epoch != epoch {
            return false;
        }
        self.modify_goals(|goals| match goals.iter_mut().find(|g| g.id == goal_id) {
            Some(goal) => {
                goal.current_value = value;
                true
            }
            None => false,
        })
    }

    fn append_goal(&self, epoch: u64, goal: Goal) -> bool {
        let session = self.lock_session();
        if session.epoch != epoch {
            return false;
        }
        self.modify_goals(|goals| {
            goals.push(goal);
            true
        })
    }

    /// Apply `f` to the goal list; when it reports a change, recompute the
    /// summary and notify subscribers.
    fn modify_goals(&self, f: impl FnOnce(&mut Vec<Goal>) -> bool) -> bool {
        self.snapshot.send_if_modified(|snapshot| {
            if !f(&mut snapshot.goals) {
                return false;
            }
            snapshot.summary = ProgressSummary::from_goals(&snapshot.goals);
            true
        })
    }

    fn set_loading(&self, loading: bool) {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.is_loading == loading {
                return false;
            }
            snapshot.is_loading = loading;
            true
        });
    }
}

/// Marks a fetch as outstanding for as long as it lives.
struct FetchGuard<'a> {
    store: &'a GoalStore,
    epoch: u64,
}

impl<'a> FetchGuard<'a> {
    fn begin(store: &'a GoalStore, epoch: u64) -> Self {
        let mut session = store.lock_session();
        if session.epoch == epoch {
            session.pending_fetches += 1;
            store.set_loading(true);
        }
        Self { store, epoch }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.store.lock_session();
        if session.epoch != self.epoch {
            return;
        }
        session.pending_fetches = session.pending_fetches.saturating_sub(1);
        if session.pending_fetches == 0 {
            self.store.set_loading(false);
        }
    }
}

/// Claims a goal id for one outstanding update when the guard is enabled.
struct UpdateClaim<'a> {
    store: &'a GoalStore,
    goal_id: String,
    epoch: u64,
}

impl<'a> UpdateClaim<'a> {
    fn acquire(store: &'a GoalStore, goal_id: &str, epoch: u64) -> Result<Option<Self>, StoreError> {
        if !store.config.guard_concurrent_updates {
            return Ok(None);
        }
        let mut session = store.lock_session();
        // A reset since `epoch` was read owns the set now; the result is discarded anyway.
        if session.epoch != epoch {
            return Ok(None);
        }
        if !session.updates_in_flight.insert(goal_id.to_string()) {
            return Err(StoreError::UpdateInFlight(goal_id.to_string()));
        }
        Ok(Some(Self {
            store,
            goal_id: goal_id.to_string(),
            epoch,
        }))
    }
}

impl Drop for UpdateClaim<'_> {
    fn drop(&mut self) {
        let mut session = self.store.lock_session();
        if session.epoch == self.epoch {
            session.updates_in_flight.remove(&self.goal_id);
        }
    }
}
