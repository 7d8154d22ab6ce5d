//! Preference-weighted ranking.
//!
//! Scores (slot, resource) candidates against the stored preferences of the
//! activity's assigned user and draws one candidate at random in proportion
//! to its score.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use u_matching::random::SeededRandom;
//! use u_matching::ranking::PreferenceRanker;
//! use u_matching::store::InMemoryStore;
//!
//! let ranker = PreferenceRanker::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(SeededRandom::from_seed(7)),
//! );
//! let picked = ranker.select_random_weighted(&["a", "b", "c"], &[4.0, 0.0, 0.0]).unwrap();
//! assert_eq!(*picked, "a");
//! ```

mod preference;
mod weighted;

pub use preference::{DayPart, PreferenceRule};
pub use weighted::{select_random_weighted, select_weighted_index};

use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{SlotResourcePair, UserPreference};
use crate::random::RandomSource;
use crate::store::UserPreferenceStore;

/// Weight of a candidate with no matching preferences.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Scores candidates by user preference and samples among them.
#[derive(Clone)]
pub struct PreferenceRanker {
    preferences: Arc<dyn UserPreferenceStore>,
    rng: Arc<dyn RandomSource>,
}

impl PreferenceRanker {
    /// Creates a ranker.
    pub fn new(preferences: Arc<dyn UserPreferenceStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self { preferences, rng }
    }

    /// The random source draws come from.
    pub fn rng(&self) -> &dyn RandomSource {
        self.rng.as_ref()
    }

    /// Loads a user's preferences for a period. Never cached.
    pub async fn load_preferences(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    ) -> Result<Vec<UserPreference>> {
        Ok(self
            .preferences
            .get_by_user_and_period(user_id, organization_id, scheduling_period_id)
            .await?)
    }

    /// Loads the user's preferences and scores one candidate.
    pub async fn calculate_weight(
        &self,
        candidate: &SlotResourcePair,
        user_id: Uuid,
        organization_id: Uuid,
        scheduling_period_id: Uuid,
    ) -> Result<f64> {
        let preferences = self
            .load_preferences(user_id, organization_id, scheduling_period_id)
            .await?;
        Ok(Self::weight_with(&preferences, candidate))
    }

    /// Scores a candidate against already-loaded preferences.
    ///
    /// Starts at [`NEUTRAL_WEIGHT`] and multiplies in every recognized
    /// preference that matches. Unrecognized keys are ignored.
    pub fn weight_with(preferences: &[UserPreference], candidate: &SlotResourcePair) -> f64 {
        let mut weight = NEUTRAL_WEIGHT;
        let mut matched = 0usize;
        for preference in preferences {
            let Some(rule) = PreferenceRule::from_key(&preference.key) else {
                continue;
            };
            if rule.matches(&preference.value, &candidate.slot) {
                weight *= rule.multiplier();
                matched += 1;
            }
        }
        trace!(
            slot_id = %candidate.slot.id,
            resource_id = %candidate.resource.id,
            matched,
            weight,
            "Scored candidate"
        );
        weight
    }

    /// Draws one candidate in proportion to its weight.
    pub fn select_random_weighted<'c, T>(
        &self,
        candidates: &'c [T],
        weights: &[f64],
    ) -> Result<&'c T> {
        select_random_weighted(candidates, weights, self.rng.as_ref())
    }
}

impl std::fmt::Debug for PreferenceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceRanker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resource, Slot};
    use crate::random::SeededRandom;
    use crate::store::InMemoryStore;
    use chrono::{NaiveTime, Weekday};

    struct Setup {
        store: Arc<InMemoryStore>,
        ranker: PreferenceRanker,
        org: Uuid,
        user: Uuid,
        period: Uuid,
    }

    fn setup() -> Setup {
        let store = Arc::new(InMemoryStore::new());
        let ranker = PreferenceRanker::new(store.clone(), Arc::new(SeededRandom::from_seed(9)));
        Setup {
            store,
            ranker,
            org: Uuid::new_v4(),
            user: Uuid::new_v4(),
            period: Uuid::new_v4(),
        }
    }

    impl Setup {
        fn prefer(&self, key: &str, value: &str) {
            self.store.upsert_preference(UserPreference::new(
                self.org,
                self.user,
                self.period,
                key,
                value,
            ));
        }

        fn candidate(&self, weekday: Weekday, start_h: u32) -> SlotResourcePair {
            let slot = Slot::new(
                self.period,
                weekday,
                NaiveTime::from_hms_opt(start_h, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(start_h + 1, 0, 0).unwrap(),
            );
            SlotResourcePair::new(slot, Resource::new(self.org, Uuid::new_v4()))
        }

        async fn weight(&self, candidate: &SlotResourcePair) -> f64 {
            self.ranker
                .calculate_weight(candidate, self.user, self.org, self.period)
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_no_preferences_is_neutral() {
        let s = setup();
        let c = s.candidate(Weekday::Mon, 9);
        assert!((s.weight(&c).await - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_preferences_multiply() {
        let s = setup();
        s.prefer("preferred_weekday", "Monday");
        s.prefer("preferred_time_morning", "true");
        s.prefer("preferred_timerange", "Monday 08:00-12:00");
        let c = s.candidate(Weekday::Mon, 9);
        // 3.0 * 3.0 * 4.0
        assert!((s.weight(&c).await - 36.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_avoid_rules_reduce_weight() {
        let s = setup();
        s.prefer("avoid_weekday", "Friday");
        s.prefer("avoid_time_evening", "");
        let c = s.candidate(Weekday::Fri, 18);
        assert!((s.weight(&c).await - 0.15).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_and_unmatched_keys_are_neutral() {
        let s = setup();
        s.prefer("favourite_colour", "blue");
        s.prefer("preferred_weekday", "Tuesday");
        s.prefer("preferred_time_afternoon", "");
        let c = s.candidate(Weekday::Mon, 9);
        assert!((s.weight(&c).await - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_other_period_preferences_ignored() {
        let s = setup();
        s.store.upsert_preference(UserPreference::new(
            s.org,
            s.user,
            Uuid::new_v4(),
            "preferred_weekday",
            "Monday",
        ));
        let c = s.candidate(Weekday::Mon, 9);
        assert!((s.weight(&c).await - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranker_selection_delegates() {
        let s = setup();
        let picked = s
            .ranker
            .select_random_weighted(&[10, 20, 30], &[0.0, 0.0, 5.0])
            .unwrap();
        assert_eq!(*picked, 30);
    }
}
