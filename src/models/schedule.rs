//! Assignments, matching requests, and matching results.
//!
//! An [`Assignment`] binds one activity to one (slot, resource) pair. The
//! matching strategies are the only writers: there is no in-place update, a
//! move is a delete followed by a create.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Resource, Slot};

/// A live binding of an activity to a (slot, resource) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique assignment identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Assigned slot.
    pub slot_id: Uuid,
    /// Assigned resource.
    pub resource_id: Uuid,
    /// Assigned activity.
    pub activity_id: Uuid,
}

impl Assignment {
    /// Creates an assignment with a fresh identifier.
    pub fn new(organization_id: Uuid, slot_id: Uuid, resource_id: Uuid, activity_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            slot_id,
            resource_id,
            activity_id,
        }
    }

    /// The (slot, resource) pair this assignment occupies.
    #[inline]
    pub fn pair(&self) -> (Uuid, Uuid) {
        (self.slot_id, self.resource_id)
    }
}

/// A candidate (slot, resource) pair.
///
/// `rank` is only set in batch mode, where it comes from a one-time random
/// permutation of the whole candidate universe (1 = highest priority).
#[derive(Debug, Clone, PartialEq)]
pub struct SlotResourcePair {
    pub slot: Slot,
    pub resource: Resource,
    pub rank: Option<usize>,
}

impl SlotResourcePair {
    /// Creates an unranked candidate.
    pub fn new(slot: Slot, resource: Resource) -> Self {
        Self {
            slot,
            resource,
            rank: None,
        }
    }

    /// Sets the rank.
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = Some(rank);
        self
    }

    /// The (slot id, resource id) key.
    #[inline]
    pub fn key(&self) -> (Uuid, Uuid) {
        (self.slot.id, self.resource.id)
    }
}

/// Selects which matching strategy handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingMode {
    /// Batch assignment of every activity in a period.
    Ranking,
    /// Repair of one activity after a constraint change.
    OnlineRematch,
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchingMode::Ranking => write!(f, "ranking"),
            MatchingMode::OnlineRematch => write!(f, "online_rematch"),
        }
    }
}

/// A matching request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchedulingRequest {
    /// Schedule every activity of the organization into the period.
    Period {
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    },
    /// Repair the assignment affected by one created or changed constraint.
    ConstraintChange {
        organization_id: Uuid,
        scheduling_period_id: Uuid,
        activity_constraint_id: Uuid,
    },
}

impl SchedulingRequest {
    /// Whole-period request.
    pub fn period(organization_id: Uuid, scheduling_period_id: Uuid) -> Self {
        SchedulingRequest::Period {
            organization_id,
            scheduling_period_id,
        }
    }

    /// Single-constraint-change request.
    pub fn constraint_change(
        organization_id: Uuid,
        scheduling_period_id: Uuid,
        activity_constraint_id: Uuid,
    ) -> Self {
        SchedulingRequest::ConstraintChange {
            organization_id,
            scheduling_period_id,
            activity_constraint_id,
        }
    }

    pub fn organization_id(&self) -> Uuid {
        match self {
            SchedulingRequest::Period {
                organization_id, ..
            }
            | SchedulingRequest::ConstraintChange {
                organization_id, ..
            } => *organization_id,
        }
    }

    pub fn scheduling_period_id(&self) -> Uuid {
        match self {
            SchedulingRequest::Period {
                scheduling_period_id,
                ..
            }
            | SchedulingRequest::ConstraintChange {
                scheduling_period_id,
                ..
            } => *scheduling_period_id,
        }
    }

    /// The mode this request shape is normally served by.
    pub fn natural_mode(&self) -> MatchingMode {
        match self {
            SchedulingRequest::Period { .. } => MatchingMode::Ranking,
            SchedulingRequest::ConstraintChange { .. } => MatchingMode::OnlineRematch,
        }
    }

    /// Identifier a result reports as its subject: the period for batch
    /// requests, the triggering constraint for constraint changes.
    pub fn subject_id(&self) -> Uuid {
        match self {
            SchedulingRequest::Period {
                scheduling_period_id,
                ..
            } => *scheduling_period_id,
            SchedulingRequest::ConstraintChange {
                activity_constraint_id,
                ..
            } => *activity_constraint_id,
        }
    }
}

/// Outcome of one matching operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingResult {
    /// Period or constraint the operation was about.
    pub subject_id: Uuid,
    /// Whether the operation completed.
    pub success: bool,
    /// Assignments created.
    pub assignments_created: usize,
    /// Existing assignments replaced (delete + create counts once).
    pub assignments_modified: usize,
    /// Activities left unscheduled, or that failed to rematch.
    pub unscheduled_or_failed_ids: Vec<Uuid>,
    /// Optional summary or failure reason.
    pub message: Option<String>,
}

impl SchedulingResult {
    /// Successful result with no changes.
    pub fn success(subject_id: Uuid) -> Self {
        Self {
            subject_id,
            success: true,
            assignments_created: 0,
            assignments_modified: 0,
            unscheduled_or_failed_ids: Vec::new(),
            message: None,
        }
    }

    /// Failed result carrying a reason.
    pub fn failure(subject_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::success(subject_id)
        }
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Records an activity as unscheduled or failed.
    pub fn with_unscheduled(mut self, activity_id: Uuid) -> Self {
        self.unscheduled_or_failed_ids.push(activity_id);
        self
    }

    /// Whether the operation changed nothing.
    pub fn is_no_op(&self) -> bool {
        self.assignments_created == 0 && self.assignments_modified == 0
    }
}
