//! Authentication state shared between the login flow and the goal store.

use tokio::sync::watch;
use tracing::info;

use crate::error::GatewayError;
use crate::model::{Credentials, UserProfile};
use crate::traits::SyncGateway;

/// Holds the authenticated user, if any, and broadcasts changes.
///
/// The flag is readable synchronously; [`GoalStore`](crate::store::GoalStore)
/// subscribes to it to clear or populate itself.
pub struct AuthGate {
    state: watch::Sender<Option<UserProfile>>,
}

impl AuthGate {
    /// A gate with nobody logged in.
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    /// A gate that starts out authenticated as `user`.
    pub fn authenticated(user: UserProfile) -> Self {
        let (state, _) = watch::channel(Some(user));
        Self { state }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().clone()
    }

    /// Receive every change of the authenticated user.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.state.subscribe()
    }

    /// Authenticate through the gateway and mark the user as logged in.
    ///
    /// On failure the current state is left as it was.
    pub async fn login(
        &self,
        gateway: &dyn SyncGateway,
        credentials: &Credentials,
    ) -> Result<UserProfile, GatewayError> {
        let user = gateway.authenticate(credentials).await?;
        info!(user_id = %user.id, gateway = gateway.name(), "logged in");
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Clear the authenticated user. No-op when nobody is logged in.
    pub fn logout(&self) {
        if self.set_user(None) {
            info!("logged out");
        }
    }

    fn set_user(&self, user: Option<UserProfile>) -> bool {
        self.state.send_if_modified(|current| {
            if *current == user {
                return false;
            }
            *current = user;
            true
        })
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}
