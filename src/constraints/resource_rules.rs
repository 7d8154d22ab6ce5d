//! Pair-scoped validators: capacity, resource type, location.

use serde::Deserialize;
use std::collections::HashSet;

use super::parse::split_list;
use super::{
    invalid_format, invalid_json, CandidateContext, ConstraintValidator, ValidatorScope,
    COMPATIBLE_RESOURCE_TYPES, LOCATION_PREFERENCE, REQUIRED_CAPACITY,
};
use crate::models::{ActivityConstraint, ConstraintType, ConstraintViolation, Resource};

fn missing_resource(constraint: &ActivityConstraint) -> ConstraintViolation {
    ConstraintViolation::hard(
        &constraint.key,
        &constraint.value,
        "Constraint requires a resource to evaluate",
    )
}

fn lowercase_set(value: &str) -> HashSet<String> {
    split_list(value).map(str::to_lowercase).collect()
}

#[derive(Debug, Deserialize)]
struct CapacityValue {
    min: Option<i64>,
    max: Option<i64>,
}

/// `required_capacity`: `{"min":int?,"max":int?}`.
///
/// The resource must have a known capacity within bounds that also seats
/// the activity's expected students.
#[derive(Debug, Clone, Copy)]
pub struct RequiredCapacityValidator;

impl RequiredCapacityValidator {
    fn check(
        bounds: &CapacityValue,
        resource: &Resource,
        expected_students: Option<u32>,
    ) -> Option<String> {
        let Some(capacity) = resource.capacity else {
            return Some("Resource has no capacity defined".to_string());
        };
        let cap = i64::from(capacity);
        if let Some(min) = bounds.min.filter(|&min| cap < min) {
            return Some(format!("Resource capacity {cap} is below minimum {min}"));
        }
        if let Some(max) = bounds.max.filter(|&max| cap > max) {
            return Some(format!("Resource capacity {cap} exceeds maximum {max}"));
        }
        if let Some(expected) = expected_students.filter(|&n| capacity < n) {
            return Some(format!(
                "Resource capacity {cap} is below expected student count {expected}"
            ));
        }
        None
    }
}

impl ConstraintValidator for RequiredCapacityValidator {
    fn key(&self) -> &'static str {
        REQUIRED_CAPACITY
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Hard
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Pair
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let bounds: CapacityValue = match serde_json::from_str(&constraint.value) {
            Ok(bounds) => bounds,
            Err(e) => return Some(invalid_json(constraint, &e)),
        };
        let Some(resource) = candidate.resource else {
            return Some(missing_resource(constraint));
        };
        Self::check(&bounds, resource, candidate.activity.expected_students)
            .map(|message| ConstraintViolation::hard(&constraint.key, &constraint.value, message))
    }

    fn description(&self) -> &'static str {
        "Resource capacity must satisfy bounds and expected attendance"
    }
}

/// `compatible_resource_types`: comma-separated type names, case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct CompatibleResourceTypesValidator;

impl ConstraintValidator for CompatibleResourceTypesValidator {
    fn key(&self) -> &'static str {
        COMPATIBLE_RESOURCE_TYPES
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Hard
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Pair
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let allowed = lowercase_set(&constraint.value);
        if allowed.is_empty() {
            return Some(invalid_format(constraint, "no compatible resource types specified"));
        }
        if candidate.resource.is_none() {
            return Some(missing_resource(constraint));
        }
        let Some(resource_type) = candidate.resource_type else {
            return Some(ConstraintViolation::hard(
                &constraint.key,
                &constraint.value,
                "Resource type could not be resolved",
            ));
        };
        if allowed.contains(&resource_type.name.trim().to_lowercase()) {
            return None;
        }
        Some(ConstraintViolation::hard(
            &constraint.key,
            &constraint.value,
            format!("Resource type '{}' is not compatible", resource_type.name),
        ))
    }

    fn description(&self) -> &'static str {
        "Resource type must be one of the compatible types"
    }
}

/// `location_preference`: comma-separated location names.
#[derive(Debug, Clone, Copy)]
pub struct LocationPreferenceValidator;

impl ConstraintValidator for LocationPreferenceValidator {
    fn key(&self) -> &'static str {
        LOCATION_PREFERENCE
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Soft
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Pair
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let preferred = lowercase_set(&constraint.value);
        if preferred.is_empty() {
            return Some(invalid_format(constraint, "no locations specified"));
        }
        let Some(resource) = candidate.resource else {
            return Some(missing_resource(constraint));
        };
        if preferred.contains(&resource.location.trim().to_lowercase()) {
            return None;
        }
        Some(ConstraintViolation::soft(
            &constraint.key,
            &constraint.value,
            format!("Location '{}' is not preferred", resource.location),
        ))
    }

    fn description(&self) -> &'static str {
        "Resource should be in a preferred location"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, ResourceType, Slot};
    use chrono::{NaiveTime, Weekday};
    use uuid::Uuid;

    struct Fixture {
        activity: Activity,
        slot: Slot,
        resource: Resource,
        resource_type: ResourceType,
    }

    fn fixture(capacity: Option<u32>, expected: Option<u32>) -> Fixture {
        let org = Uuid::new_v4();
        let resource_type = ResourceType::new("Lecture Hall");
        let mut resource = Resource::new(org, resource_type.id).with_location("Main Building");
        resource.capacity = capacity;
        let mut activity = Activity::new(org, Uuid::new_v4(), Uuid::new_v4());
        activity.expected_students = expected;
        let slot = Slot::new(
            Uuid::new_v4(),
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        Fixture {
            activity,
            slot,
            resource,
            resource_type,
        }
    }

    fn run(
        validator: &dyn ConstraintValidator,
        value: &str,
        f: &Fixture,
        with_type: bool,
    ) -> Option<ConstraintViolation> {
        let c = ActivityConstraint::new(
            f.activity.organization_id,
            f.activity.id,
            validator.key(),
            value,
        );
        let ctx = CandidateContext::pair(
            &f.activity,
            &f.slot,
            &f.resource,
            with_type.then_some(&f.resource_type),
        );
        validator.validate(&c, &ctx)
    }

    #[test]
    fn test_capacity_below_minimum() {
        let f = fixture(Some(20), None);
        let v = run(&RequiredCapacityValidator, r#"{"min":30}"#, &f, true).unwrap();
        assert!(v.is_hard());
        assert!(v.message.contains("below minimum"));
    }

    #[test]
    fn test_capacity_above_maximum() {
        let f = fixture(Some(200), None);
        let v = run(&RequiredCapacityValidator, r#"{"min":30,"max":100}"#, &f, true).unwrap();
        assert!(v.message.contains("exceeds maximum"));
    }

    #[test]
    fn test_capacity_within_bounds() {
        let f = fixture(Some(50), Some(45));
        assert!(run(&RequiredCapacityValidator, r#"{"min":30,"max":100}"#, &f, true).is_none());
        assert!(run(&RequiredCapacityValidator, "{}", &f, true).is_none());
    }

    #[test]
    fn test_capacity_below_expected_students() {
        let f = fixture(Some(40), Some(45));
        let v = run(&RequiredCapacityValidator, "{}", &f, true).unwrap();
        assert!(v.message.contains("expected student count 45"));
    }

    #[test]
    fn test_capacity_unknown() {
        let f = fixture(None, None);
        let v = run(&RequiredCapacityValidator, r#"{"min":1}"#, &f, true).unwrap();
        assert_eq!(v.message, "Resource has no capacity defined");
    }

    #[test]
    fn test_capacity_bad_json() {
        let f = fixture(Some(10), None);
        let v = run(&RequiredCapacityValidator, "min=30", &f, true).unwrap();
        assert_eq!(v.message, "Invalid JSON format");
    }

    #[test]
    fn test_capacity_without_resource() {
        let f = fixture(Some(10), None);
        let c = ActivityConstraint::new(Uuid::new_v4(), f.activity.id, REQUIRED_CAPACITY, "{}");
        let v = RequiredCapacityValidator
            .validate(&c, &CandidateContext::slot_only(&f.activity, &f.slot))
            .unwrap();
        assert!(v.is_hard());
    }

    #[test]
    fn test_compatible_types_case_insensitive() {
        let f = fixture(Some(10), None);
        let value = "laboratory, LECTURE HALL";
        assert!(run(&CompatibleResourceTypesValidator, value, &f, true).is_none());
    }

    #[test]
    fn test_compatible_types_mismatch() {
        let f = fixture(Some(10), None);
        let v = run(&CompatibleResourceTypesValidator, "Laboratory", &f, true).unwrap();
        assert!(v.is_hard());
        assert!(v.message.contains("Lecture Hall"));
    }

    #[test]
    fn test_compatible_types_unresolved_or_empty() {
        let f = fixture(Some(10), None);
        let v = run(&CompatibleResourceTypesValidator, "Lecture Hall", &f, false).unwrap();
        assert_eq!(v.message, "Resource type could not be resolved");

        let v = run(&CompatibleResourceTypesValidator, " , ", &f, true).unwrap();
        assert_eq!(v.message, "Invalid constraint format");
    }

    #[test]
    fn test_location_preference() {
        let f = fixture(Some(10), None);
        assert!(run(&LocationPreferenceValidator, "main building,Annex", &f, true).is_none());

        let v = run(&LocationPreferenceValidator, "Annex", &f, true).unwrap();
        assert!(!v.is_hard());
        assert!(v.message.contains("Main Building"));
    }
}
