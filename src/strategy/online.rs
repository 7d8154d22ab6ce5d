//! Online rematch strategy.
//!
//! Repairs a single activity after one of its constraints was created or
//! changed. If the activity's current slot is still allowed nothing is
//! touched; otherwise the assignment is moved to a freshly sampled valid
//! candidate.
//!
//! The move is delete-then-create. Between the two writes the activity is
//! unassigned, and a failure after the delete leaves it unassigned.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{commit_weighted, MatchingStrategy, OccupancyMap};
use crate::cancel::CancellationToken;
use crate::config::MatchingConfig;
use crate::constraints::ConstraintProcessor;
use crate::error::Result;
use crate::models::{
    Activity, Assignment, MatchingMode, SchedulingRequest, SchedulingResult, Slot,
    SlotResourcePair,
};
use crate::ranking::PreferenceRanker;
use crate::store::MatchingStores;

/// Single-activity repair strategy.
#[derive(Debug, Clone)]
pub struct OnlineRematchStrategy {
    stores: MatchingStores,
    processor: ConstraintProcessor,
    ranker: PreferenceRanker,
    config: MatchingConfig,
}

impl OnlineRematchStrategy {
    pub fn new(
        stores: MatchingStores,
        processor: ConstraintProcessor,
        ranker: PreferenceRanker,
        config: MatchingConfig,
    ) -> Self {
        Self {
            stores,
            processor,
            ranker,
            config,
        }
    }

    async fn rematch(
        &self,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
        activity_constraint_id: Uuid,
    ) -> Result<SchedulingResult> {
        let subject = activity_constraint_id;

        let Some(constraint) = self.stores.constraints.get_by_id(activity_constraint_id).await?
        else {
            warn!(%activity_constraint_id, "Constraint not found, nothing to rematch");
            return Ok(SchedulingResult::failure(
                subject,
                format!("Activity constraint {activity_constraint_id} not found"),
            ));
        };

        let Some(activity) = self.stores.activities.get_by_id(constraint.activity_id).await? else {
            warn!(
                %activity_constraint_id,
                activity_id = %constraint.activity_id,
                "Constrained activity not found"
            );
            return Ok(SchedulingResult::failure(
                subject,
                format!("Activity {} not found", constraint.activity_id),
            ));
        };

        let current_assignments = self
            .stores
            .assignments
            .get_by_activity_id(activity.id)
            .await?;
        let Some(current) = current_assignments.first().cloned() else {
            debug!(activity_id = %activity.id, "Activity has no assignment, nothing to repair");
            return Ok(SchedulingResult::success(subject)
                .with_message("Activity is not assigned, no changes"));
        };
        if current_assignments.len() > 1 {
            warn!(
                activity_id = %activity.id,
                assignments = current_assignments.len(),
                "Activity holds more than one assignment, rematching the first"
            );
        }

        let slots = self
            .stores
            .slots
            .get_by_scheduling_period(scheduling_period_id)
            .await?;
        let excluded = self
            .processor
            .excluded_among(&activity, organization_id, &slots)
            .await?;
        if !excluded.contains(&current.slot_id) {
            debug!(
                activity_id = %activity.id,
                slot_id = %current.slot_id,
                "Current slot still allowed, no changes"
            );
            return Ok(SchedulingResult::success(subject)
                .with_message("Current assignment satisfies all hard constraints, no changes"));
        }

        info!(
            activity_id = %activity.id,
            assignment_id = %current.id,
            slot_id = %current.slot_id,
            "Current slot is now excluded, moving assignment"
        );
        self.stores.assignments.delete(current.id).await?;

        // The activity is unassigned from here on; failures must name it.
        let moved = self
            .relocate(&activity, organization_id, scheduling_period_id, &slots, &excluded)
            .await;
        Ok(match moved {
            Ok(Some(assignment)) => {
                info!(
                    activity_id = %activity.id,
                    slot_id = %assignment.slot_id,
                    resource_id = %assignment.resource_id,
                    "Assignment moved"
                );
                let mut result = SchedulingResult::success(subject)
                    .with_message("Assignment moved to a new slot/resource");
                result.assignments_modified = 1;
                result
            }
            Ok(None) => SchedulingResult::failure(
                subject,
                "No valid alternative slot/resource; activity left unassigned",
            )
            .with_unscheduled(activity.id),
            Err(e) => {
                error!(
                    activity_id = %activity.id,
                    error = %e,
                    "Rematch failed after the old assignment was deleted"
                );
                SchedulingResult::failure(
                    subject,
                    format!("Online rematch failed, activity left unassigned: {e}"),
                )
                .with_unscheduled(activity.id)
            }
        })
    }

    /// Picks and persists a new pair for an activity whose assignment was
    /// just deleted. `None` means no candidate could be committed.
    async fn relocate(
        &self,
        activity: &Activity,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
        slots: &[Slot],
        excluded: &HashSet<Uuid>,
    ) -> Result<Option<Assignment>> {
        let live = self.stores.assignments.get_all(organization_id).await?;
        let mut occupancy = OccupancyMap::from_assignments(&live, slots);
        let resources = self.stores.resources.get_all().await?;
        let filter = self.processor.resource_filter(activity, &resources).await?;

        let candidates: Vec<SlotResourcePair> = slots
            .iter()
            .filter(|slot| !excluded.contains(&slot.id))
            .flat_map(|slot| {
                resources
                    .iter()
                    .map(move |resource| SlotResourcePair::new(slot.clone(), resource.clone()))
            })
            .filter(|pair| {
                occupancy.is_free(&pair.slot, pair.resource.id)
                    && pair.resource.can_seat(activity.expected_students)
                    && filter.allows(&pair.slot, &pair.resource)
            })
            .collect();

        if candidates.is_empty() {
            warn!(activity_id = %activity.id, "No alternative candidate, activity left unassigned");
            return Ok(None);
        }

        let preferences = self
            .ranker
            .load_preferences(
                activity.assigned_user_id,
                activity.organization_id,
                scheduling_period_id,
            )
            .await?;
        let weights: Vec<f64> = candidates
            .iter()
            .map(|pair| PreferenceRanker::weight_with(&preferences, pair))
            .collect();

        commit_weighted(
            self.stores.assignments.as_ref(),
            &self.ranker,
            self.config.max_conflict_retries,
            activity,
            candidates,
            weights,
            &mut occupancy,
        )
        .await
    }
}

#[async_trait]
impl MatchingStrategy for OnlineRematchStrategy {
    fn mode(&self) -> MatchingMode {
        MatchingMode::OnlineRematch
    }

    async fn execute(
        &self,
        request: &SchedulingRequest,
        cancel: &CancellationToken,
    ) -> SchedulingResult {
        let &SchedulingRequest::ConstraintChange {
            organization_id,
            scheduling_period_id,
            activity_constraint_id,
        } = request
        else {
            return SchedulingResult::failure(
                request.subject_id(),
                "Online rematch requires a constraint-change request",
            );
        };

        if cancel.is_cancelled() {
            return SchedulingResult::failure(activity_constraint_id, "Cancelled before rematch");
        }

        match self
            .rematch(organization_id, scheduling_period_id, activity_constraint_id)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(%activity_constraint_id, error = %e, "Online rematch failed");
                SchedulingResult::failure(
                    activity_constraint_id,
                    format!("Online rematch failed: {e}"),
                )
            }
        }
    }
}
