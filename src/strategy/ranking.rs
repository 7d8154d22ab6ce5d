//! Batch "Ranking" strategy.
//!
//! Assigns every activity of an organization into a scheduling period in
//! one pass. Borrowing from Karp, Vazirani & Vazirani's Ranking algorithm
//! for online bipartite matching, the candidate universe (slots ×
//! resources) is permuted once per run and the permutation position becomes
//! a fixed priority. Each activity then samples among its best-ranked
//! valid candidates, biased by the assigned user's preferences.
//!
//! # Algorithm
//! 1. Load activities, period slots, all resources, existing assignments.
//! 2. Rank the universe with one uniform random permutation (rank 1..|L|).
//! 3. For each activity in load order:
//!    - drop excluded slots, occupied pairs, under-capacity resources, and
//!      pairs failing resource-dependent hard rules;
//!    - keep the `top_k` best-ranked survivors;
//!    - weight each by `preference × exp(-decay × (rank - 1))`;
//!    - sample one and persist it.
//!
//! This is a diversification heuristic; no optimality or feasibility
//! guarantee is made.
//!
//! # Reference
//! Karp, Vazirani & Vazirani (1990), "An optimal algorithm for on-line
//! bipartite matching"

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
    Activity, Assignment, MatchingMode, Resource, SchedulingRequest, SchedulingResult, Slot,
    SlotResourcePair,
};
use crate::random::shuffle;
use crate::ranking::PreferenceRanker;
use crate::store::MatchingStores;

/// Batch assignment strategy.
#[derive(Debug, Clone)]
pub struct RankingStrategy {
    stores: MatchingStores,
    processor: ConstraintProcessor,
    ranker: PreferenceRanker,
    config: MatchingConfig,
}

/// Data loaded once per run.
struct RunInputs {
    slots: Vec<Slot>,
    resources: Vec<Resource>,
    universe: Vec<SlotResourcePair>,
}

impl RankingStrategy {
    /// Creates the strategy.
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

    /// Builds slots × resources and ranks it by one random permutation.
    ///
    /// The returned vector is ordered by rank, starting at 1.
    pub fn ranked_universe(
        &self,
        slots: &[Slot],
        resources: &[Resource],
    ) -> Vec<SlotResourcePair> {
        let universe: Vec<SlotResourcePair> = slots
            .iter()
            .flat_map(|slot| {
                resources
                    .iter()
                    .map(move |resource| SlotResourcePair::new(slot.clone(), resource.clone()))
            })
            .collect();
        shuffle(universe, self.ranker.rng())
            .into_iter()
            .enumerate()
            .map(|(position, pair)| pair.with_rank(position + 1))
            .collect()
    }

    /// Rank decay factor `exp(-decay × (rank - 1))`.
    pub fn rank_factor(&self, rank: usize) -> f64 {
        (-self.config.rank_decay * rank.saturating_sub(1) as f64).exp()
    }

    async fn run(
        &self,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
        cancel: &CancellationToken,
        result: &mut SchedulingResult,
    ) -> Result<()> {
        let activities = self.stores.activities.get_all(organization_id).await?;
        let slots = self
            .stores
            .slots
            .get_by_scheduling_period(scheduling_period_id)
            .await?;
        let resources = self.stores.resources.get_all().await?;
        let existing = self.stores.assignments.get_all(organization_id).await?;

        let mut occupancy = OccupancyMap::from_assignments(&existing, &slots);
        let already_assigned: HashSet<Uuid> = existing.iter().map(|a| a.activity_id).collect();
        let universe = self.ranked_universe(&slots, &resources);
        let inputs = RunInputs {
            slots,
            resources,
            universe,
        };

        info!(
            %organization_id,
            %scheduling_period_id,
            activities = activities.len(),
            slots = inputs.slots.len(),
            resources = inputs.resources.len(),
            candidates = inputs.universe.len(),
            "Starting ranking run"
        );

        for (position, activity) in activities.iter().enumerate() {
            if cancel.is_cancelled() {
                let remaining: Vec<Uuid> = activities[position..]
                    .iter()
                    .filter(|a| !already_assigned.contains(&a.id))
                    .map(|a| a.id)
                    .collect();
                warn!(
                    processed = position,
                    remaining = remaining.len(),
                    "Ranking run cancelled"
                );
                result.unscheduled_or_failed_ids.extend(remaining);
                result.success = false;
                result.message = Some(format!(
                    "Cancelled after {position} of {} activities",
                    activities.len()
                ));
                return Ok(());
            }

            if already_assigned.contains(&activity.id) {
                debug!(activity_id = %activity.id, "Activity already assigned, skipping");
                continue;
            }

            match self
                .schedule_activity(activity, scheduling_period_id, &inputs, &mut occupancy)
                .await?
            {
                Some(assignment) => {
                    debug!(
                        activity_id = %activity.id,
                        slot_id = %assignment.slot_id,
                        resource_id = %assignment.resource_id,
                        "Activity scheduled"
                    );
                    result.assignments_created += 1;
                }
                None => {
                    debug!(activity_id = %activity.id, "No valid candidate, activity unscheduled");
                    result.unscheduled_or_failed_ids.push(activity.id);
                }
            }
        }

        result.message = Some(format!(
            "Scheduled {} activities, {} unscheduled",
            result.assignments_created,
            result.unscheduled_or_failed_ids.len()
        ));
        Ok(())
    }

    async fn schedule_activity(
        &self,
        activity: &Activity,
        scheduling_period_id: Uuid,
        inputs: &RunInputs,
        occupancy: &mut OccupancyMap,
    ) -> Result<Option<Assignment>> {
        let excluded = self
            .processor
            .excluded_among(activity, activity.organization_id, &inputs.slots)
            .await?;
        let filter = self
            .processor
            .resource_filter(activity, &inputs.resources)
            .await?;

        let top: Vec<SlotResourcePair> = inputs
            .universe
            .iter()
            .filter(|pair| {
                !excluded.contains(&pair.slot.id)
                    && occupancy.is_free(&pair.slot, pair.resource.id)
                    && pair.resource.can_seat(activity.expected_students)
                    && filter.allows(&pair.slot, &pair.resource)
            })
            .take(self.config.top_k)
            .cloned()
            .collect();
        if top.is_empty() {
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
        let weights: Vec<f64> = top
            .iter()
            .map(|pair| {
                PreferenceRanker::weight_with(&preferences, pair)
                    * self.rank_factor(pair.rank.unwrap_or(1))
            })
            .collect();

        commit_weighted(
            self.stores.assignments.as_ref(),
            &self.ranker,
            self.config.max_conflict_retries,
            activity,
            top,
            weights,
            occupancy,
        )
        .await
    }
}

#[async_trait]
impl MatchingStrategy for RankingStrategy {
    fn mode(&self) -> MatchingMode {
        MatchingMode::Ranking
    }

    async fn execute(
        &self,
        request: &SchedulingRequest,
        cancel: &CancellationToken,
    ) -> SchedulingResult {
        let &SchedulingRequest::Period {
            organization_id,
            scheduling_period_id,
        } = request
        else {
            return SchedulingResult::failure(
                request.subject_id(),
                "Ranking strategy requires a whole-period request",
            );
        };

        let mut result = SchedulingResult::success(scheduling_period_id);
        if let Err(e) = self
            .run(organization_id, scheduling_period_id, cancel, &mut result)
            .await
        {
            error!(
                %organization_id,
                %scheduling_period_id,
                created = result.assignments_created,
                error = %e,
                "Ranking run aborted"
            );
            result.success = false;
            result.message = Some(format!("Ranking run aborted: {e}"));
            return result;
        }

        info!(
            %scheduling_period_id,
            created = result.assignments_created,
            unscheduled = result.unscheduled_or_failed_ids.len(),
            success = result.success,
            "Ranking run finished"
        );
        result
    }
}
