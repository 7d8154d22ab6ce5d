//! Constraint-driven activity-to-resource matching.
//!
//! Assigns activities (lessons, sessions) to a weekly slot and a physical
//! resource (room) so that hard constraints hold, no (slot, resource) pair is
//! booked twice, and the assigned user's preferences bias the choice.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Activity`, `Slot`, `Resource`,
//!   `ActivityConstraint`, `UserPreference`, `Assignment`, `SchedulingResult`
//! - **`constraints`**: Per-key validators, the validator registry, and the
//!   constraint processor that computes excluded slots
//! - **`ranking`**: Preference weights and weighted random selection
//! - **`strategy`**: Batch Ranking and online rematch strategies
//! - **`orchestrator`**: Mode-based dispatch, the engine's entry point
//! - **`store`**: Async persistence traits and an in-memory implementation
//! - **`validation`**: Integrity audit over live assignments
//! - **`config`**, **`error`**, **`logging`**, **`random`**, **`cancel`**:
//!   Supporting infrastructure
//!
//! # Architecture
//!
//! Validators → constraint processor → {Ranking, online rematch} (both also
//! use the ranker) → orchestrator. The engine never holds a lock across
//! "read candidates → select → persist"; pair uniqueness rests on the
//! store's insert-if-absent `add`, and strategies re-select on conflict.
//!
//! # References
//!
//! - Karp, Vazirani & Vazirani (1990), "An optimal algorithm for on-line
//!   bipartite matching"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod cancel;
pub mod config;
pub mod constraints;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod random;
pub mod ranking;
pub mod store;
pub mod strategy;
pub mod validation;

pub use cancel::CancellationToken;
pub use config::MatchingConfig;
pub use error::{MatchingError, Result, StoreError};
pub use models::{MatchingMode, SchedulingRequest, SchedulingResult};
pub use orchestrator::MatchingOrchestrator;
