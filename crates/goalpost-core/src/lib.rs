//! goalpost-core: goal store, auth gate, and progress summaries.
//!
//! This crate defines the data model, the sync gateway trait, and the
//! session state that the rest of goalpost builds on.

pub mod auth;
pub mod error;
pub mod model;
pub mod query;
pub mod store;
pub mod summary;
pub mod traits;
pub mod validation;

pub use auth::AuthGate;
pub use error::{GatewayError, StoreError, ValidationError};
pub use model::{Credentials, Goal, NewGoal, ProgressSummary, UpdateAck, UserProfile};
pub use store::{GoalStore, StoreConfig, StoreSnapshot};
pub use traits::SyncGateway;
