//! In-memory store.
//!
//! Implements every store trait on `parking_lot` locks. Insertion order is
//! kept so loads are stable, which the batch strategy relies on for its
//! "activities in load order" processing.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{
    ActivityConstraintStore, ActivityStore, AssignmentStore, ResourceStore, ResourceTypeStore,
    SlotStore, UserPreferenceStore,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Activity, ActivityConstraint, Assignment, Resource, ResourceType, Slot, UserPreference,
};

/// Thread-safe in-memory implementation of all matching stores.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    activities: RwLock<Vec<Activity>>,
    slots: RwLock<Vec<Slot>>,
    resources: RwLock<Vec<Resource>>,
    resource_types: RwLock<Vec<ResourceType>>,
    assignments: RwLock<Vec<Assignment>>,
    constraints: RwLock<Vec<ActivityConstraint>>,
    preferences: RwLock<Vec<UserPreference>>,
}

/// Replaces the entry with the same id, or appends.
fn upsert<T: Clone>(items: &RwLock<Vec<T>>, item: T, id_of: impl Fn(&T) -> Uuid) {
    let mut items = items.write();
    let id = id_of(&item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_activity(&self, activity: Activity) {
        upsert(&self.activities, activity, |a| a.id);
    }

    pub fn upsert_slot(&self, slot: Slot) {
        upsert(&self.slots, slot, |s| s.id);
    }

    pub fn upsert_resource(&self, resource: Resource) {
        upsert(&self.resources, resource, |r| r.id);
    }

    pub fn upsert_resource_type(&self, resource_type: ResourceType) {
        upsert(&self.resource_types, resource_type, |t| t.id);
    }

    pub fn upsert_constraint(&self, constraint: ActivityConstraint) {
        upsert(&self.constraints, constraint, |c| c.id);
    }

    pub fn upsert_preference(&self, preference: UserPreference) {
        upsert(&self.preferences, preference, |p| p.id);
    }

    /// Removes a constraint. Returns whether it existed.
    pub fn remove_constraint(&self, id: Uuid) -> bool {
        let mut constraints = self.constraints.write();
        let before = constraints.len();
        constraints.retain(|c| c.id != id);
        constraints.len() != before
    }

    /// Snapshot of every live assignment.
    pub fn assignments_snapshot(&self) -> Vec<Assignment> {
        self.assignments.read().clone()
    }

    /// Snapshot of every slot.
    pub fn slots_snapshot(&self) -> Vec<Slot> {
        self.slots.read().clone()
    }

    /// Snapshot of every resource.
    pub fn resources_snapshot(&self) -> Vec<Resource> {
        self.resources.read().clone()
    }

    /// Snapshot of every activity.
    pub fn activities_snapshot(&self) -> Vec<Activity> {
        self.activities.read().clone()
    }
}

#[async_trait]
impl ActivityStore for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Activity>> {
        Ok(self.activities.read().iter().find(|a| a.id == id).cloned())
    }

    async fn get_all(&self, organization_id: Uuid) -> StoreResult<Vec<Activity>> {
        Ok(self
            .activities
            .read()
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SlotStore for InMemoryStore {
    async fn get_by_scheduling_period(&self, scheduling_period_id: Uuid) -> StoreResult<Vec<Slot>> {
        Ok(self
            .slots
            .read()
            .iter()
            .filter(|s| s.scheduling_period_id == scheduling_period_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get_all(&self) -> StoreResult<Vec<Resource>> {
        Ok(self.resources.read().clone())
    }
}

#[async_trait]
impl ResourceTypeStore for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ResourceType>> {
        Ok(self.resource_types.read().iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn get_all(&self, organization_id: Uuid) -> StoreResult<Vec<Assignment>> {
        Ok(self
            .assignments
            .read()
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn get_by_activity_id(&self, activity_id: Uuid) -> StoreResult<Vec<Assignment>> {
        Ok(self
            .assignments
            .read()
            .iter()
            .filter(|a| a.activity_id == activity_id)
            .cloned()
            .collect())
    }

    async fn add(&self, assignment: Assignment) -> StoreResult<()> {
        // Check and insert under one write lock.
        let mut assignments = self.assignments.write();
        let taken = assignments.iter().any(|a| {
            a.organization_id == assignment.organization_id && a.pair() == assignment.pair()
        });
        if taken {
            return Err(StoreError::Conflict {
                slot_id: assignment.slot_id,
                resource_id: assignment.resource_id,
            });
        }
        assignments.push(assignment);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut assignments = self.assignments.write();
        let before = assignments.len();
        assignments.retain(|a| a.id != id);
        if assignments.len() == before {
            return Err(StoreError::NotFound {
                entity: "assignment",
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityConstraintStore for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ActivityConstraint>> {
        Ok(self.constraints.read().iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_activity_id(&self, activity_id: Uuid) -> StoreResult<Vec<ActivityConstraint>> {
        Ok(self
            .constraints
            .read()
            .iter()
            .filter(|c| c.activity_id == activity_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserPreferenceStore for InMemoryStore {
    async fn get_by_user_and_period(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    ) -> StoreResult<Vec<UserPreference>> {
        Ok(self
            .preferences
            .read()
            .iter()
            .filter(|p| {
                p.user_id == user_id
                    && p.organization_id == organization_id
                    && p.scheduling_period_id == scheduling_period_id
            })
            .cloned()
            .collect())
    }
}
