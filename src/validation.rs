//! Integrity checks over a set of live assignments.
//!
//! Audits persisted matching output. Detects:
//! - Two assignments sharing a (slot, resource) pair
//! - Overlapping same-weekday slots booked on one resource
//! - Resources too small for the activity's expected students
//! - References to unknown slots, resources, or activities
//! - Activities holding more than one assignment
//!
//! All errors are collected; the check never stops at the first one.

use crate::models::{Activity, Assignment, Resource, Slot};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two assignments in one organization share a (slot, resource) pair.
    DoubleBooking,
    /// One resource holds two overlapping slots on the same weekday.
    ResourceOverlap,
    /// Resource capacity is below the activity's expected students.
    CapacityExceeded,
    /// An assignment references a slot, resource, or activity that doesn't exist.
    UnknownReference,
    /// An activity holds more than one assignment.
    MultipleAssignments,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates live assignments against the entities they reference.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_assignments(
    assignments: &[Assignment],
    slots: &[Slot],
    resources: &[Resource],
    activities: &[Activity],
) -> ValidationResult {
    let slots_by_id: HashMap<Uuid, &Slot> = slots.iter().map(|s| (s.id, s)).collect();
    let resources_by_id: HashMap<Uuid, &Resource> = resources.iter().map(|r| (r.id, r)).collect();
    let activities_by_id: HashMap<Uuid, &Activity> =
        activities.iter().map(|a| (a.id, a)).collect();

    let mut errors = Vec::new();
    let mut pairs = HashSet::new();
    let mut per_activity: HashMap<Uuid, usize> = HashMap::new();

    for a in assignments {
        if !pairs.insert((a.organization_id, a.slot_id, a.resource_id)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DoubleBooking,
                format!(
                    "Slot {} on resource {} is booked more than once",
                    a.slot_id, a.resource_id
                ),
            ));
        }
        *per_activity.entry(a.activity_id).or_default() += 1;

        let slot = slots_by_id.get(&a.slot_id);
        let resource = resources_by_id.get(&a.resource_id);
        let activity = activities_by_id.get(&a.activity_id);
        for (missing, entity, id) in [
            (slot.is_none(), "slot", a.slot_id),
            (resource.is_none(), "resource", a.resource_id),
            (activity.is_none(), "activity", a.activity_id),
        ] {
            if missing {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Assignment {} references unknown {entity} {id}", a.id),
                ));
            }
        }

        if let (Some(resource), Some(activity)) = (resource, activity) {
            if !resource.can_seat(activity.expected_students) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityExceeded,
                    format!(
                        "Resource {} (capacity {:?}) cannot seat {:?} students of activity {}",
                        resource.id, resource.capacity, activity.expected_students, activity.id
                    ),
                ));
            }
        }
    }

    for (activity_id, count) in &per_activity {
        if *count > 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::MultipleAssignments,
                format!("Activity {activity_id} holds {count} assignments"),
            ));
        }
    }

    errors.extend(detect_overlaps(assignments, &slots_by_id));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Finds distinct slots on one resource whose weekly windows overlap.
fn detect_overlaps(
    assignments: &[Assignment],
    slots_by_id: &HashMap<Uuid, &Slot>,
) -> Vec<ValidationError> {
    let mut by_resource: HashMap<(Uuid, Uuid), Vec<&Slot>> = HashMap::new();
    for a in assignments {
        if let Some(slot) = slots_by_id.get(&a.slot_id) {
            by_resource
                .entry((a.organization_id, a.resource_id))
                .or_default()
                .push(slot);
        }
    }

    let mut errors = Vec::new();
    for ((_, resource_id), booked) in &by_resource {
        for (i, first) in booked.iter().enumerate() {
            for second in &booked[i + 1..] {
                if first.id != second.id && first.overlaps(second) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ResourceOverlap,
                        format!(
                            "Resource {resource_id} holds overlapping slots {} and {}",
                            first.id, second.id
                        ),
                    ));
                }
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};

    struct Fixture {
        org: Uuid,
        slots: Vec<Slot>,
        resources: Vec<Resource>,
        activities: Vec<Activity>,
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let org = Uuid::new_v4();
        let period = Uuid::new_v4();
        let room_type = Uuid::new_v4();
        Fixture {
            org,
            slots: vec![
                Slot::new(period, Weekday::Mon, t(9, 0), t(10, 0)),
                Slot::new(period, Weekday::Mon, t(9, 30), t(10, 30)),
                Slot::new(period, Weekday::Tue, t(9, 0), t(10, 0)),
            ],
            resources: vec![
                Resource::new(org, room_type).with_capacity(30),
                Resource::new(org, room_type).with_capacity(10),
            ],
            activities: vec![
                Activity::new(org, Uuid::new_v4(), Uuid::new_v4()).with_expected_students(25),
                Activity::new(org, Uuid::new_v4(), Uuid::new_v4()),
                Activity::new(org, Uuid::new_v4(), Uuid::new_v4()),
            ],
        }
    }

    fn assign(f: &Fixture, slot: usize, resource: usize, activity: usize) -> Assignment {
        Assignment::new(
            f.org,
            f.slots[slot].id,
            f.resources[resource].id,
            f.activities[activity].id,
        )
    }

    fn kinds(f: &Fixture, assignments: &[Assignment]) -> Vec<ValidationErrorKind> {
        validate_assignments(assignments, &f.slots, &f.resources, &f.activities)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_assignments() {
        let f = fixture();
        let assignments = vec![assign(&f, 0, 0, 0), assign(&f, 2, 0, 1), assign(&f, 0, 1, 2)];
        assert!(validate_assignments(&assignments, &f.slots, &f.resources, &f.activities).is_ok());
    }

    #[test]
    fn test_empty_is_valid() {
        let f = fixture();
        assert!(validate_assignments(&[], &f.slots, &f.resources, &f.activities).is_ok());
    }

    #[test]
    fn test_double_booking() {
        let f = fixture();
        let kinds = kinds(&f, &[assign(&f, 0, 0, 1), assign(&f, 0, 0, 2)]);
        assert_eq!(kinds, vec![ValidationErrorKind::DoubleBooking]);
    }

    #[test]
    fn test_same_pair_in_other_organization_is_not_double_booking() {
        let f = fixture();
        let mut other = assign(&f, 0, 0, 2);
        other.organization_id = Uuid::new_v4();
        assert!(kinds(&f, &[assign(&f, 0, 0, 1), other]).is_empty());
    }

    #[test]
    fn test_resource_overlap() {
        let f = fixture();
        let kinds = kinds(&f, &[assign(&f, 0, 0, 1), assign(&f, 1, 0, 2)]);
        assert_eq!(kinds, vec![ValidationErrorKind::ResourceOverlap]);
    }

    #[test]
    fn test_capacity_exceeded() {
        let f = fixture();
        let kinds = kinds(&f, &[assign(&f, 0, 1, 0)]);
        assert_eq!(kinds, vec![ValidationErrorKind::CapacityExceeded]);
    }

    #[test]
    fn test_unknown_reference() {
        let f = fixture();
        let stray = Assignment::new(f.org, Uuid::new_v4(), f.resources[0].id, Uuid::new_v4());
        let kinds = kinds(&f, &[stray]);
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::UnknownReference,
                ValidationErrorKind::UnknownReference
            ]
        );
    }

    #[test]
    fn test_multiple_assignments() {
        let f = fixture();
        let kinds = kinds(&f, &[assign(&f, 0, 0, 1), assign(&f, 2, 1, 1)]);
        assert_eq!(kinds, vec![ValidationErrorKind::MultipleAssignments]);
    }

    #[test]
    fn test_multiple_errors() {
        let f = fixture();
        let assignments = vec![assign(&f, 0, 1, 0), assign(&f, 0, 1, 1), assign(&f, 1, 1, 2)];
        let errors =
            validate_assignments(&assignments, &f.slots, &f.resources, &f.activities).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
