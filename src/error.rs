//! Error types for the matching engine.
//!
//! Store failures, argument checks, and configuration problems each get a
//! `thiserror` enum. Strategies never let these escape: they are folded into
//! a failed [`SchedulingResult`](crate::models::SchedulingResult) at the
//! strategy boundary. Only the orchestrator surfaces [`MatchingError`] to the
//! caller, and only for configuration mistakes.

use thiserror::Error;
use uuid::Uuid;

use crate::models::MatchingMode;

/// Errors raised by the persistence boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("slot {slot_id} is already booked on resource {resource_id}")]
    Conflict { slot_id: Uuid, resource_id: Uuid },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised inside the matching engine.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no strategy registered for mode {0}")]
    NoStrategyForMode(MatchingMode),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, MatchingError>;

/// Errors raised while loading or validating [`MatchingConfig`](crate::config::MatchingConfig).
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read configuration file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid configuration value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}
