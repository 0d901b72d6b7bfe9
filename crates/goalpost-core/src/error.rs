//! Error types for the gateway and the goal store.
//!
//! `GatewayError` is defined here rather than in `goalpost-gateway` so the
//! store can classify failures without string matching.

use thiserror::Error;

/// Errors a sync gateway can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Login was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The referenced goal does not exist on the backend.
    #[error("goal not found: {0}")]
    NotFound(String),

    /// The backend returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The backend is unavailable or failed for an unspecified reason.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Returns `true` if repeating the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidCredentials | GatewayError::NotFound(_)
        )
    }
}

/// Rejected input to a store write.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("target value must be positive, got {0}")]
    NonPositiveTarget(f64),

    #[error("progress {value} exceeds the allowed maximum of {max}")]
    AboveCap { value: f64, max: f64 },

    #[error("title must not be empty")]
    EmptyTitle,
}

/// Errors returned by goal store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The auth gate reports no authenticated user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The goal is not in the current collection.
    #[error("unknown goal: {0}")]
    GoalNotFound(String),

    /// Another update for the same goal has not settled yet.
    #[error("an update for goal {0} is already in flight")]
    UpdateInFlight(String),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}
