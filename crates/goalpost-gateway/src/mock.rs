//! In-memory gateway for demos and tests.
//!
//! Seeded with four demo goals and one demo account. Creates and updates
//! persist for the lifetime of the gateway, so a later fetch sees them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use goalpost_core::error::GatewayError;
use goalpost_core::model::{Credentials, Goal, NewGoal, UpdateAck, UserProfile};
use goalpost_core::traits::SyncGateway;

pub const DEMO_EMAIL: &str = "demo@goalpost.dev";
pub const DEMO_PASSWORD: &str = "password123";

/// The gateway operations, for latency, failure injection, and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    FetchGoals,
    UpdateGoal,
    CreateGoal,
}

/// Artificial delay per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyProfile {
    pub authenticate: Duration,
    pub fetch_goals: Duration,
    pub update_goal: Duration,
    pub create_goal: Duration,
}

impl LatencyProfile {
    /// Answer immediately.
    pub fn none() -> Self {
        Self::default()
    }

    /// Delays that feel like a slow backend.
    pub fn simulated() -> Self {
        Self {
            authenticate: Duration::from_millis(500),
            fetch_goals: Duration::from_millis(1000),
            update_goal: Duration::from_millis(600),
            create_goal: Duration::from_millis(800),
        }
    }

    fn for_operation(&self, op: Operation) -> Duration {
        match op {
            Operation::Authenticate => self.authenticate,
            Operation::FetchGoals => self.fetch_goals,
            Operation::UpdateGoal => self.update_goal,
            Operation::CreateGoal => self.create_goal,
        }
    }
}

struct Account {
    profile: UserProfile,
    password: String,
}

/// A mock sync gateway backed by a goal list in memory.
pub struct MockGateway {
    goals: Mutex<Vec<Goal>>,
    accounts: Vec<Account>,
    latency: LatencyProfile,
    /// Millisecond timestamp used for the most recently issued id.
    last_id_millis: AtomicI64,
    failures: Mutex<HashMap<Operation, GatewayError>>,
    calls: Mutex<HashMap<Operation, u32>>,
}

impl MockGateway {
    /// A gateway holding `goals` with the demo account.
    pub fn new(goals: Vec<Goal>) -> Self {
        Self {
            goals: Mutex::new(goals),
            accounts: vec![Account {
                profile: demo_user(),
                password: DEMO_PASSWORD.to_string(),
            }],
            latency: LatencyProfile::none(),
            last_id_millis: AtomicI64::new(0),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// A gateway holding the four demo goals.
    pub fn seeded() -> Self {
        Self::new(seed_goals())
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    /// Register another account.
    pub fn with_account(mut self, profile: UserProfile, password: &str) -> Self {
        self.accounts.push(Account {
            profile,
            password: password.to_string(),
        });
        self
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: Operation, error: GatewayError) {
        lock(&self.failures).insert(op, error);
    }

    /// Number of calls made for `op`, including failed ones.
    pub fn call_count(&self, op: Operation) -> u32 {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// The goals as the backend currently holds them.
    pub fn stored_goals(&self) -> Vec<Goal> {
        lock(&self.goals).clone()
    }

    async fn enter(&self, op: Operation) -> Result<(), GatewayError> {
        *lock(&self.calls).entry(op).or_default() += 1;

        let delay = self.latency.for_operation(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match lock(&self.failures).remove(&op) {
            Some(error) => {
                debug!(?op, %error, "injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// `goal-<unix millis>`, bumped past the last issued id so ids never repeat.
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_id_millis.compare_exchange(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format!("goal-{next}"),
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl SyncGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_goals(&self) -> Result<Vec<Goal>, GatewayError> {
        self.enter(Operation::FetchGoals).await?;
        Ok(self.stored_goals())
    }

    async fn update_goal(
        &self,
        goal_id: &str,
        current_value: f64,
    ) -> Result<UpdateAck, GatewayError> {
        self.enter(Operation::UpdateGoal).await?;
        let mut goals = lock(&self.goals);
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| GatewayError::NotFound(goal_id.to_string()))?;
        goal.current_value = current_value;
        Ok(UpdateAck { success: true })
    }

    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, GatewayError> {
        self.enter(Operation::CreateGoal).await?;
        let created = Goal::from_new(self.next_id(), goal.clone());
        lock(&self.goals).push(created.clone());
        Ok(created)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<UserProfile, GatewayError> {
        self.enter(Operation::Authenticate).await?;
        self.accounts
            .iter()
            .find(|a| a.profile.email == credentials.email && a.password == credentials.password)
            .map(|a| a.profile.clone())
            .ok_or(GatewayError::InvalidCredentials)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// The demo account's profile.
pub fn demo_user() -> UserProfile {
    UserProfile {
        id: "user-1".into(),
        name: "Demo User".into(),
        email: DEMO_EMAIL.into(),
        avatar: None,
    }
}

/// The four demo goals.
pub fn seed_goals() -> Vec<Goal> {
    vec![
        Goal {
            id: "goal-1".into(),
            title: "Complete Coding Project".into(),
            description: "Finish the application for the client presentation".into(),
            target_value: 100.0,
            current_value: 65.0,
            unit: "%".into(),
            start_date: date(2025, 2, 1),
            end_date: date(2025, 3, 15),
            category: "Work".into(),
            color: "#3B82F6".into(),
        },
        Goal {
            id: "goal-2".into(),
            title: "Read Programming Book".into(),
            description: "Finish \"Clean Code\" by Robert C. Martin".into(),
            target_value: 320.0,
            current_value: 180.0,
            unit: "pages".into(),
            start_date: date(2025, 1, 15),
            end_date: date(2025, 4, 1),
            category: "Learning".into(),
            color: "#8B5CF6".into(),
        },
        Goal {
            id: "goal-3".into(),
            title: "Exercise Routine".into(),
            description: "Regular gym sessions for better health".into(),
            target_value: 20.0,
            current_value: 8.0,
            unit: "sessions".into(),
            start_date: date(2025, 2, 1),
            end_date: date(2025, 2, 28),
            category: "Health".into(),
            color: "#10B981".into(),
        },
        Goal {
            id: "goal-4".into(),
            title: "Save Money".into(),
            description: "Monthly savings goal".into(),
            target_value: 1000.0,
            current_value: 450.0,
            unit: "$".into(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            category: "Finance".into(),
            color: "#F59E0B".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_goal(title: &str) -> NewGoal {
        NewGoal {
            title: title.into(),
            description: String::new(),
            target_value: 12.0,
            current_value: 0.0,
            unit: "books".into(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            category: "Learning".into(),
            color: "#8B5CF6".into(),
        }
    }

    #[tokio::test]
    async fn demo_login() {
        let gateway = MockGateway::seeded();
        let user = gateway
            .authenticate(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();
        assert_eq!(user.id, "user-1");

        let err = gateway
            .authenticate(&Credentials::new(DEMO_EMAIL, "nope"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::InvalidCredentials);
        assert_eq!(gateway.call_count(Operation::Authenticate), 2);
    }

    #[tokio::test]
    async fn created_goals_get_fresh_ids_and_persist() {
        let gateway = MockGateway::seeded();
        let a = gateway.create_goal(&new_goal("A")).await.unwrap();
        let b = gateway.create_goal(&new_goal("B")).await.unwrap();
        assert!(a.id.starts_with("goal-"));
        assert_ne!(a.id, b.id);

        let goals = gateway.fetch_goals().await.unwrap();
        assert_eq!(goals.len(), 6);
        assert_eq!(goals[4].title, "A");
        assert_eq!(goals[5].title, "B");
    }

    #[tokio::test]
    async fn update_unknown_goal_fails() {
        let gateway = MockGateway::seeded();
        let err = gateway.update_goal("goal-404", 1.0).await.unwrap_err();
        assert_eq!(err, GatewayError::NotFound("goal-404".into()));

        gateway.update_goal("goal-3", 20.0).await.unwrap();
        assert_eq!(gateway.stored_goals()[2].current_value, 20.0);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let gateway = MockGateway::seeded();
        gateway.fail_next(
            Operation::FetchGoals,
            GatewayError::Network("connection reset".into()),
        );
        assert!(gateway.fetch_goals().await.is_err());
        assert_eq!(gateway.fetch_goals().await.unwrap().len(), 4);
        assert_eq!(gateway.call_count(Operation::FetchGoals), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_delays_calls() {
        let gateway = MockGateway::seeded().with_latency(LatencyProfile::simulated());
        let start = tokio::time::Instant::now();
        gateway.fetch_goals().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
