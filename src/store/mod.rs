//! Persistence boundary.
//!
//! One async trait per store the engine reads from or writes to. Entity CRUD
//! lives elsewhere; the engine only needs these lookups plus assignment
//! add/delete. [`MatchingStores`] bundles the handles a strategy needs.
//!
//! # Write conflicts
//!
//! Nothing in the engine holds a lock across "read candidates, select,
//! persist". [`AssignmentStore::add`] must therefore be an atomic
//! insert-if-absent on (organization, slot, resource) and report a taken
//! pair as [`StoreError::Conflict`]; strategies re-select on conflict.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Activity, ActivityConstraint, Assignment, Resource, ResourceType, Slot, UserPreference,
};

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Activity>>;

    /// All activities of an organization, in a stable load order.
    async fn get_all(&self, organization_id: Uuid) -> StoreResult<Vec<Activity>>;
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get_by_scheduling_period(&self, scheduling_period_id: Uuid) -> StoreResult<Vec<Slot>>;
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_all(&self) -> StoreResult<Vec<Resource>>;
}

#[async_trait]
pub trait ResourceTypeStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ResourceType>>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn get_all(&self, organization_id: Uuid) -> StoreResult<Vec<Assignment>>;

    async fn get_by_activity_id(&self, activity_id: Uuid) -> StoreResult<Vec<Assignment>>;

    /// Inserts if the (organization, slot, resource) pair is free.
    ///
    /// Returns [`StoreError::Conflict`] when the pair is already taken.
    async fn add(&self, assignment: Assignment) -> StoreResult<()>;

    /// Deletes by id. Returns [`StoreError::NotFound`] for unknown ids.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait ActivityConstraintStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ActivityConstraint>>;

    async fn get_by_activity_id(&self, activity_id: Uuid) -> StoreResult<Vec<ActivityConstraint>>;
}

#[async_trait]
pub trait UserPreferenceStore: Send + Sync {
    async fn get_by_user_and_period(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    ) -> StoreResult<Vec<UserPreference>>;
}

/// Store handles shared by the processor, the ranker, and the strategies.
#[derive(Clone)]
pub struct MatchingStores {
    pub activities: Arc<dyn ActivityStore>,
    pub slots: Arc<dyn SlotStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub resource_types: Arc<dyn ResourceTypeStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub constraints: Arc<dyn ActivityConstraintStore>,
    pub preferences: Arc<dyn UserPreferenceStore>,
}

impl MatchingStores {
    /// Uses one in-memory store for every handle.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            activities: store.clone(),
            slots: store.clone(),
            resources: store.clone(),
            resource_types: store.clone(),
            assignments: store.clone(),
            constraints: store.clone(),
            preferences: store,
        }
    }

    /// Replaces the assignment store.
    pub fn with_assignments(mut self, assignments: Arc<dyn AssignmentStore>) -> Self {
        self.assignments = assignments;
        self
    }

    /// Replaces the constraint store.
    pub fn with_constraints(mut self, constraints: Arc<dyn ActivityConstraintStore>) -> Self {
        self.constraints = constraints;
        self
    }
}

impl std::fmt::Debug for MatchingStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingStores").finish_non_exhaustive()
    }
}

/// Loads an entity that must exist.
pub(crate) fn require<T>(entity: &'static str, id: Uuid, found: Option<T>) -> StoreResult<T> {
    found.ok_or(StoreError::NotFound { entity, id })
}
