//! Activity model.
//!
//! An activity is the schedulable unit: a class, exam, or meeting that needs
//! one (slot, resource) pair. Activities are owned by entity management and
//! read-only to the matching engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An activity to be matched to a slot and resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Subject the activity teaches or covers.
    pub subject_id: Uuid,
    /// User responsible for the activity; their preferences bias matching.
    pub assigned_user_id: Uuid,
    /// Free-form activity type label (e.g. "lecture", "lab").
    pub activity_type: String,
    /// Expected attendance, compared against resource capacity.
    pub expected_students: Option<u32>,
}

impl Activity {
    /// Creates an activity with a fresh identifier.
    pub fn new(organization_id: Uuid, subject_id: Uuid, assigned_user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            subject_id,
            assigned_user_id,
            activity_type: String::new(),
            expected_students: None,
        }
    }

    /// Overrides the identifier.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the activity type label.
    pub fn with_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    /// Sets the expected student count.
    pub fn with_expected_students(mut self, count: u32) -> Self {
        self.expected_students = Some(count);
        self
    }
}
