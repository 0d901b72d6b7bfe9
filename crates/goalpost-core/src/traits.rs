//! Core trait definitions for sync gateways.
//!
//! The async `SyncGateway` trait is implemented by the `goalpost-gateway`
//! crate (an in-memory mock and an HTTP client).

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::{Credentials, Goal, NewGoal, UpdateAck, UserProfile};

// ---------------------------------------------------------------------------
// Sync Gateway trait
// ---------------------------------------------------------------------------

/// Backend interface for goal CRUD and authentication.
///
/// Calls suspend the caller until they settle; implementations decide about
/// timeouts.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Human-readable gateway name (e.g. "mock").
    fn name(&self) -> &str;

    /// Fetch every goal of the current user, in backend order.
    async fn fetch_goals(&self) -> Result<Vec<Goal>, GatewayError>;

    /// Set the current value of a goal.
    async fn update_goal(&self, goal_id: &str, current_value: f64)
        -> Result<UpdateAck, GatewayError>;

    /// Create a goal. The gateway assigns the id.
    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, GatewayError>;

    /// Exchange credentials for a user profile.
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserProfile, GatewayError>;
}
