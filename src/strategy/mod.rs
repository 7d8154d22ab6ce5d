//! Matching strategies.
//!
//! - [`RankingStrategy`]: batch assignment of every activity in a period.
//! - [`OnlineRematchStrategy`]: repair of one activity after a constraint
//!   change.
//!
//! Both are infallible at their boundary: any error inside a run is turned
//! into a failed [`SchedulingResult`] carrying the error text. Assignments
//! committed before the error are kept.

mod occupancy;
mod online;
mod ranking;

pub use occupancy::OccupancyMap;
pub use online::OnlineRematchStrategy;
pub use ranking::RankingStrategy;

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::warn;

use crate::cancel::CancellationToken;
use crate::error::{Result, StoreError};
use crate::models::{
    Activity, Assignment, MatchingMode, SchedulingRequest, SchedulingResult, SlotResourcePair,
};
use crate::ranking::{select_weighted_index, PreferenceRanker};
use crate::store::AssignmentStore;

/// A matching strategy selected by [`MatchingMode`].
#[async_trait]
pub trait MatchingStrategy: Send + Sync + Debug {
    /// Mode this strategy serves.
    fn mode(&self) -> MatchingMode;

    /// Runs the strategy. Never fails; errors become a failed result.
    async fn execute(
        &self,
        request: &SchedulingRequest,
        cancel: &CancellationToken,
    ) -> SchedulingResult;
}

/// Draws a candidate by weight and persists it, re-drawing when the store
/// reports the pair was taken concurrently.
///
/// Returns `None` when every candidate was lost to conflicts or the retry
/// budget ran out. The occupancy map is updated for committed and
/// conflicting pairs alike.
pub(crate) async fn commit_weighted(
    assignments: &dyn AssignmentStore,
    ranker: &PreferenceRanker,
    max_conflict_retries: u32,
    activity: &Activity,
    mut candidates: Vec<SlotResourcePair>,
    mut weights: Vec<f64>,
    occupancy: &mut OccupancyMap,
) -> Result<Option<Assignment>> {
    let mut conflicts = 0u32;
    while !candidates.is_empty() {
        let index = select_weighted_index(&weights, ranker.rng())?;
        let chosen = &candidates[index];
        let assignment = Assignment::new(
            activity.organization_id,
            chosen.slot.id,
            chosen.resource.id,
            activity.id,
        );

        match assignments.add(assignment.clone()).await {
            Ok(()) => {
                occupancy.occupy(&chosen.slot, chosen.resource.id);
                return Ok(Some(assignment));
            }
            Err(StoreError::Conflict {
                slot_id,
                resource_id,
            }) => {
                occupancy.occupy(&chosen.slot, chosen.resource.id);
                if conflicts >= max_conflict_retries {
                    warn!(
                        activity_id = %activity.id,
                        %slot_id,
                        %resource_id,
                        conflicts,
                        "Write conflict retry budget exhausted"
                    );
                    return Ok(None);
                }
                warn!(
                    activity_id = %activity.id,
                    %slot_id,
                    %resource_id,
                    "Pair taken concurrently, re-selecting"
                );
                // Drops the lost pair and anything now overlapping it.
                (candidates, weights) = candidates
                    .into_iter()
                    .zip(weights)
                    .filter(|(c, _)| occupancy.is_free(&c.slot, c.resource.id))
                    .unzip();
                conflicts += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}
