//! Constraint processor.
//!
//! Aggregates an activity's stored constraints and evaluates them through
//! the [`ValidatorRegistry`]. Nothing is cached: every call reloads the
//! activity's constraints so a rematch always sees the current state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{CandidateContext, ConstraintValidator, ValidatorRegistry, ValidatorScope};
use crate::error::Result;
use crate::models::{
    Activity, ActivityConstraint, ConstraintType, ConstraintViolation, Resource, ResourceType,
    Slot,
};
use crate::store::{require, MatchingStores};

/// Evaluates activity constraints against slots and candidate pairs.
#[derive(Debug, Clone)]
pub struct ConstraintProcessor {
    stores: MatchingStores,
    registry: Arc<ValidatorRegistry>,
}

type BoundConstraint = (ActivityConstraint, Arc<dyn ConstraintValidator>);

impl ConstraintProcessor {
    /// Creates a processor over the given stores and validators.
    pub fn new(stores: MatchingStores, registry: Arc<ValidatorRegistry>) -> Self {
        Self { stores, registry }
    }

    /// The validator registry in use.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Slots of a period excluded for an activity by slot-scoped hard rules.
    ///
    /// Resource-dependent rules are not folded in; see [`ResourceFilter`].
    pub async fn excluded_slot_ids(
        &self,
        activity_id: Uuid,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    ) -> Result<HashSet<Uuid>> {
        let activity = require(
            "activity",
            activity_id,
            self.stores.activities.get_by_id(activity_id).await?,
        )?;
        let slots = self
            .stores
            .slots
            .get_by_scheduling_period(scheduling_period_id)
            .await?;
        self.excluded_among(&activity, organization_id, &slots).await
    }

    /// Like [`excluded_slot_ids`](Self::excluded_slot_ids) over slots the
    /// caller already loaded. Constraints are still loaded fresh.
    pub async fn excluded_among(
        &self,
        activity: &Activity,
        organization_id: Uuid,
        slots: &[Slot],
    ) -> Result<HashSet<Uuid>> {
        let bound = self
            .bound_constraints(activity.id, organization_id, |v| {
                v.constraint_type() == ConstraintType::Hard && v.scope() == ValidatorScope::Slot
            })
            .await?;

        let excluded: HashSet<Uuid> = slots
            .iter()
            .filter(|slot| {
                let ctx = CandidateContext::slot_only(activity, slot);
                bound
                    .iter()
                    .any(|(c, v)| v.validate(c, &ctx).is_some_and(|viol| viol.is_hard()))
            })
            .map(|slot| slot.id)
            .collect();

        debug!(
            activity_id = %activity.id,
            constraints = bound.len(),
            slots = slots.len(),
            excluded = excluded.len(),
            "Computed excluded slots"
        );
        Ok(excluded)
    }

    /// Loads the pair-scoped hard rules for an activity, resolving the
    /// types of the given resources.
    pub async fn resource_filter(
        &self,
        activity: &Activity,
        resources: &[Resource],
    ) -> Result<ResourceFilter> {
        let constraints = self
            .bound_constraints(activity.id, activity.organization_id, |v| {
                v.constraint_type() == ConstraintType::Hard && v.scope() == ValidatorScope::Pair
            })
            .await?;
        let resource_types = if constraints.is_empty() {
            HashMap::new()
        } else {
            self.resolve_types(resources).await?
        };
        Ok(ResourceFilter {
            activity: activity.clone(),
            constraints,
            resource_types,
        })
    }

    /// Runs every registered validator (hard and soft) for one candidate.
    ///
    /// Constraint keys without a validator are skipped.
    pub async fn validate_candidate(
        &self,
        activity: &Activity,
        slot: &Slot,
        resource: &Resource,
    ) -> Result<Vec<ConstraintViolation>> {
        let bound = self
            .bound_constraints(activity.id, activity.organization_id, |_| true)
            .await?;
        let resource_type = self
            .stores
            .resource_types
            .get_by_id(resource.resource_type_id)
            .await?;
        let ctx = CandidateContext::pair(activity, slot, resource, resource_type.as_ref());
        Ok(bound
            .iter()
            .filter_map(|(c, v)| v.validate(c, &ctx))
            .collect())
    }

    async fn bound_constraints(
        &self,
        activity_id: Uuid,
        organization_id: Uuid,
        wanted: impl Fn(&dyn ConstraintValidator) -> bool,
    ) -> Result<Vec<BoundConstraint>> {
        let constraints = self.stores.constraints.get_by_activity_id(activity_id).await?;
        Ok(constraints
            .into_iter()
            .filter(|c| c.organization_id == organization_id)
            .filter_map(|c| {
                let validator = self.registry.get(&c.key)?.clone();
                if !wanted(validator.as_ref()) {
                    return None;
                }
                Some((c, validator))
            })
            .collect())
    }

    async fn resolve_types(&self, resources: &[Resource]) -> Result<HashMap<Uuid, ResourceType>> {
        let ids: HashSet<Uuid> = resources.iter().map(|r| r.resource_type_id).collect();
        let mut types = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(resource_type) = self.stores.resource_types.get_by_id(id).await? {
                types.insert(id, resource_type);
            }
        }
        Ok(types)
    }
}

/// Per-activity filter for resource-dependent hard rules.
///
/// Built once per activity; applied to each candidate pair in memory.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    activity: Activity,
    constraints: Vec<BoundConstraint>,
    resource_types: HashMap<Uuid, ResourceType>,
}

impl ResourceFilter {
    /// Whether no pair-scoped hard rule violates this pair.
    pub fn allows(&self, slot: &Slot, resource: &Resource) -> bool {
        self.violations(slot, resource).next().is_none()
    }

    /// Hard violations for this pair.
    pub fn violations<'a>(
        &'a self,
        slot: &'a Slot,
        resource: &'a Resource,
    ) -> impl Iterator<Item = ConstraintViolation> + 'a {
        let ctx = CandidateContext::pair(
            &self.activity,
            slot,
            resource,
            self.resource_types.get(&resource.resource_type_id),
        );
        self.constraints
            .iter()
            .filter_map(move |(c, v)| v.validate(c, &ctx))
            .filter(ConstraintViolation::is_hard)
    }

    /// Number of rules the filter applies.
    pub fn rule_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::constraints::{
        COMPATIBLE_RESOURCE_TYPES, FORBIDDEN_TIMERANGE, PREFERRED_WEEKDAYS, REQUIRED_CAPACITY,
        TIME_RANGE,
    };
    use crate::error::{MatchingError, StoreError, StoreResult};
    use crate::store::{ActivityConstraintStore, InMemoryStore};
    use chrono::{NaiveTime, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    struct World {
        store: Arc<InMemoryStore>,
        processor: ConstraintProcessor,
        org: Uuid,
        period: Uuid,
        activity: Activity,
    }

    fn world() -> World {
        let store = Arc::new(InMemoryStore::new());
        let org = Uuid::new_v4();
        let period = Uuid::new_v4();
        let activity = Activity::new(org, Uuid::new_v4(), Uuid::new_v4());
        store.upsert_activity(activity.clone());
        let processor = ConstraintProcessor::new(
            MatchingStores::in_memory(store.clone()),
            Arc::new(ValidatorRegistry::with_defaults()),
        );
        World {
            store,
            processor,
            org,
            period,
            activity,
        }
    }

    impl World {
        fn slot(&self, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Slot {
            let slot = Slot::new(self.period, weekday, start, end);
            self.store.upsert_slot(slot.clone());
            slot
        }

        fn constrain(&self, key: &str, value: &str) -> ActivityConstraint {
            let c = ActivityConstraint::new(self.org, self.activity.id, key, value);
            self.store.upsert_constraint(c.clone());
            c
        }
    }

    #[tokio::test]
    async fn test_no_constraints_excludes_nothing() {
        let w = world();
        w.slot(Weekday::Mon, t(9, 0), t(10, 0));
        let excluded = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert!(excluded.is_empty());
    }

    #[tokio::test]
    async fn test_time_range_and_forbidden_exclude() {
        let w = world();
        let early = w.slot(Weekday::Mon, t(7, 0), t(8, 0));
        let blocked = w.slot(Weekday::Tue, t(10, 0), t(11, 0));
        let fine = w.slot(Weekday::Wed, t(10, 0), t(11, 0));
        w.constrain(TIME_RANGE, r#"{"start":"08:00","end":"18:00"}"#);
        w.constrain(FORBIDDEN_TIMERANGE, "Tuesday 09:00-12:00");

        let excluded = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert!(excluded.contains(&early.id));
        assert!(excluded.contains(&blocked.id));
        assert!(!excluded.contains(&fine.id));
    }

    #[tokio::test]
    async fn test_soft_and_pair_rules_do_not_exclude() {
        let w = world();
        let slot = w.slot(Weekday::Tue, t(10, 0), t(11, 0));
        w.constrain(PREFERRED_WEEKDAYS, "Monday");
        w.constrain(REQUIRED_CAPACITY, r#"{"min":500}"#);
        w.constrain("unknown_key", "whatever");

        let excluded = w
            .processor
            .excluded_among(&w.activity, w.org, std::slice::from_ref(&slot))
            .await
            .unwrap();
        assert!(excluded.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_hard_rule_excludes_every_slot() {
        let w = world();
        w.slot(Weekday::Mon, t(9, 0), t(10, 0));
        w.slot(Weekday::Tue, t(9, 0), t(10, 0));
        w.constrain(TIME_RANGE, "not json");

        let excluded = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert_eq!(excluded.len(), 2);
    }

    #[tokio::test]
    async fn test_other_organization_constraints_ignored() {
        let w = world();
        w.slot(Weekday::Mon, t(7, 0), t(8, 0));
        w.store.upsert_constraint(ActivityConstraint::new(
            Uuid::new_v4(),
            w.activity.id,
            TIME_RANGE,
            r#"{"start":"08:00","end":"18:00"}"#,
        ));
        let excluded = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert!(excluded.is_empty());
    }

    #[tokio::test]
    async fn test_missing_activity_is_not_found() {
        let w = world();
        let err = w
            .processor
            .excluded_slot_ids(Uuid::new_v4(), w.org, w.period)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("activity not found"));
    }

    #[tokio::test]
    async fn test_removed_constraint_stops_excluding() {
        let w = world();
        let blocked = w.slot(Weekday::Tue, t(10, 0), t(11, 0));
        let rule = w.constrain(FORBIDDEN_TIMERANGE, "Tuesday 09:00-12:00");
        let before = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert!(before.contains(&blocked.id));

        assert!(w.store.remove_constraint(rule.id));
        assert!(!w.store.remove_constraint(rule.id));
        let after = w
            .processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn test_keys_outside_registry_are_ignored() {
        let w = world();
        let early = w.slot(Weekday::Mon, t(7, 0), t(8, 0));
        w.constrain(TIME_RANGE, r#"{"start":"08:00","end":"18:00"}"#);
        let processor = ConstraintProcessor::new(
            MatchingStores::in_memory(w.store.clone()),
            Arc::new(ValidatorRegistry::new()),
        );
        assert!(processor.registry().is_empty());
        assert_eq!(w.processor.registry().len(), 7);

        let excluded = processor
            .excluded_among(&w.activity, w.org, std::slice::from_ref(&early))
            .await
            .unwrap();
        assert!(excluded.is_empty());
    }

    struct DownConstraints;

    #[async_trait]
    impl ActivityConstraintStore for DownConstraints {
        async fn get_by_id(&self, _id: Uuid) -> StoreResult<Option<ActivityConstraint>> {
            Err(StoreError::Backend("constraint store offline".into()))
        }

        async fn get_by_activity_id(
            &self,
            _activity_id: Uuid,
        ) -> StoreResult<Vec<ActivityConstraint>> {
            Err(StoreError::Backend("constraint store offline".into()))
        }
    }

    #[tokio::test]
    async fn test_constraint_store_error_propagates() {
        let w = world();
        w.slot(Weekday::Mon, t(9, 0), t(10, 0));
        let stores =
            MatchingStores::in_memory(w.store.clone()).with_constraints(Arc::new(DownConstraints));
        let processor =
            ConstraintProcessor::new(stores, Arc::new(ValidatorRegistry::with_defaults()));

        let err = processor
            .excluded_slot_ids(w.activity.id, w.org, w.period)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchingError::Store(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_resource_filter() {
        let w = world();
        let slot = w.slot(Weekday::Mon, t(9, 0), t(10, 0));
        let lab = ResourceType::new("Laboratory");
        let hall = ResourceType::new("Lecture Hall");
        w.store.upsert_resource_type(lab.clone());
        w.store.upsert_resource_type(hall.clone());
        let small_lab = Resource::new(w.org, lab.id).with_capacity(20);
        let big_lab = Resource::new(w.org, lab.id).with_capacity(60);
        let big_hall = Resource::new(w.org, hall.id).with_capacity(200);
        w.constrain(REQUIRED_CAPACITY, r#"{"min":30}"#);
        w.constrain(COMPATIBLE_RESOURCE_TYPES, "laboratory");

        let resources = vec![small_lab.clone(), big_lab.clone(), big_hall.clone()];
        let filter = w
            .processor
            .resource_filter(&w.activity, &resources)
            .await
            .unwrap();
        assert_eq!(filter.rule_count(), 2);
        assert!(!filter.allows(&slot, &small_lab));
        assert!(filter.allows(&slot, &big_lab));
        assert!(!filter.allows(&slot, &big_hall));
    }

    #[tokio::test]
    async fn test_validate_candidate_reports_soft_and_hard() {
        let w = world();
        let slot = w.slot(Weekday::Tue, t(9, 0), t(10, 0));
        let kind = ResourceType::new("Seminar Room");
        w.store.upsert_resource_type(kind.clone());
        let room = Resource::new(w.org, kind.id).with_capacity(10);
        w.constrain(PREFERRED_WEEKDAYS, "Monday,Wednesday");
        w.constrain(REQUIRED_CAPACITY, r#"{"min":30}"#);

        let violations = w
            .processor
            .validate_candidate(&w.activity, &slot, &room)
            .await
            .unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations.iter().filter(|v| v.is_hard()).count(), 1);
    }
}
