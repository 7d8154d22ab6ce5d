//! Per-run occupancy tracking.
//!
//! One [`OccupancyMap`] is owned by one strategy run and passed by mutable
//! reference through its loop; it is never shared across runs. It only
//! grows during a run and does not observe external writes.
//!
//! A pair is unavailable when the exact (slot, resource) pair is taken, or
//! when the resource already holds a slot on the same weekday whose
//! interval intersects the candidate's.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::{Assignment, Slot, WeeklyWindow};

#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    pairs: HashSet<(Uuid, Uuid)>,
    windows: HashMap<Uuid, Vec<WeeklyWindow>>,
}

impl OccupancyMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the map from live assignments.
    ///
    /// Assignments whose slot is not among `slots` (another period) still
    /// block their exact pair but contribute no window.
    pub fn from_assignments(assignments: &[Assignment], slots: &[Slot]) -> Self {
        let by_id: HashMap<Uuid, &Slot> = slots.iter().map(|s| (s.id, s)).collect();
        let mut map = Self::new();
        for assignment in assignments {
            match by_id.get(&assignment.slot_id) {
                Some(slot) => map.occupy(slot, assignment.resource_id),
                None => map.occupy_pair(assignment.slot_id, assignment.resource_id),
            }
        }
        map
    }

    /// Whether the resource can take this slot.
    pub fn is_free(&self, slot: &Slot, resource_id: Uuid) -> bool {
        if self.pairs.contains(&(slot.id, resource_id)) {
            return false;
        }
        let window = slot.window();
        self.windows
            .get(&resource_id)
            .map_or(true, |held| !held.iter().any(|w| w.overlaps(&window)))
    }

    /// Marks the pair and the slot's window as taken on the resource.
    pub fn occupy(&mut self, slot: &Slot, resource_id: Uuid) {
        self.pairs.insert((slot.id, resource_id));
        self.windows.entry(resource_id).or_default().push(slot.window());
    }

    /// Marks only the exact pair as taken.
    pub fn occupy_pair(&mut self, slot_id: Uuid, resource_id: Uuid) {
        self.pairs.insert((slot_id, resource_id));
    }

    /// Whether the exact pair is taken.
    pub fn contains_pair(&self, slot_id: Uuid, resource_id: Uuid) -> bool {
        self.pairs.contains(&(slot_id, resource_id))
    }

    /// Number of occupied pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is occupied.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
