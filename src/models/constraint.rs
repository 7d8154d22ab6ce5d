//! Stored constraints and preferences.
//!
//! Both entities are key/value records: the key selects the semantics
//! (which validator or preference rule applies), the value carries a
//! per-key payload (comma-separated list, JSON object, or a bare token).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A constraint attached to one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConstraint {
    /// Unique constraint identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Constrained activity.
    pub activity_id: Uuid,
    /// Selects the validator (e.g. `"time_range"`).
    pub key: String,
    /// Validator-specific payload.
    pub value: String,
}

impl ActivityConstraint {
    /// Creates a constraint with a fresh identifier.
    pub fn new(
        organization_id: Uuid,
        activity_id: Uuid,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            activity_id,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Overrides the identifier.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A user's scheduling preference for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Unique preference identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// User the preference belongs to.
    pub user_id: Uuid,
    /// Scheduling period the preference applies to.
    pub scheduling_period_id: Uuid,
    /// Preference rule (e.g. `"preferred_weekday"`).
    pub key: String,
    /// Rule payload.
    pub value: String,
}

impl UserPreference {
    /// Creates a preference with a fresh identifier.
    pub fn new(
        organization_id: Uuid,
        user_id: Uuid,
        scheduling_period_id: Uuid,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
            scheduling_period_id,
            key: key.into(),
            value: value.into(),
        }
    }
}
