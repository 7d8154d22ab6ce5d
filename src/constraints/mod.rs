//! Constraint validators and the constraint processor.
//!
//! Each validator owns exactly one constraint key and is a pure function of
//! (constraint, activity, slot, resource). Validators are total: malformed
//! payloads become a hard violation instead of an error.
//!
//! # Keys
//!
//! | Key | Type | Scope |
//! |-----|------|-------|
//! | `time_range` | Hard | Slot |
//! | `forbidden_timerange` | Hard | Slot |
//! | `required_capacity` | Hard | Pair |
//! | `compatible_resource_types` | Hard | Pair |
//! | `preferred_timerange` | Soft | Slot |
//! | `preferred_weekdays` | Soft | Slot |
//! | `location_preference` | Soft | Pair |
//!
//! Slot-scoped hard rules decide slot exclusion
//! ([`ConstraintProcessor::excluded_slot_ids`]); pair-scoped hard rules are
//! applied per candidate through a [`ResourceFilter`]. Soft rules never
//! exclude anything.

pub mod parse;
mod processor;
mod resource_rules;
mod time_rules;

pub use processor::{ConstraintProcessor, ResourceFilter};
pub use resource_rules::{
    CompatibleResourceTypesValidator, LocationPreferenceValidator, RequiredCapacityValidator,
};
pub use time_rules::{
    ForbiddenTimeRangeValidator, PreferredTimeRangeValidator, PreferredWeekdaysValidator,
    TimeRangeValidator,
};

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::models::{
    Activity, ActivityConstraint, ConstraintType, ConstraintViolation, Resource, ResourceType,
    Slot,
};

pub const TIME_RANGE: &str = "time_range";
pub const REQUIRED_CAPACITY: &str = "required_capacity";
pub const COMPATIBLE_RESOURCE_TYPES: &str = "compatible_resource_types";
pub const FORBIDDEN_TIMERANGE: &str = "forbidden_timerange";
pub const PREFERRED_TIMERANGE: &str = "preferred_timerange";
pub const PREFERRED_WEEKDAYS: &str = "preferred_weekdays";
pub const LOCATION_PREFERENCE: &str = "location_preference";

/// What a validator needs to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorScope {
    /// Depends on the slot only.
    Slot,
    /// Depends on the resource as well.
    Pair,
}

/// The candidate under evaluation.
///
/// `resource` is `None` when a slot is evaluated on its own (slot exclusion).
/// `resource_type` is the resource's resolved type, if it could be found.
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    pub activity: &'a Activity,
    pub slot: &'a Slot,
    pub resource: Option<&'a Resource>,
    pub resource_type: Option<&'a ResourceType>,
}

impl<'a> CandidateContext<'a> {
    /// Context for evaluating a slot without a resource.
    pub fn slot_only(activity: &'a Activity, slot: &'a Slot) -> Self {
        Self {
            activity,
            slot,
            resource: None,
            resource_type: None,
        }
    }

    /// Context for a full (slot, resource) pair.
    pub fn pair(
        activity: &'a Activity,
        slot: &'a Slot,
        resource: &'a Resource,
        resource_type: Option<&'a ResourceType>,
    ) -> Self {
        Self {
            activity,
            slot,
            resource: Some(resource),
            resource_type,
        }
    }
}

/// A validator for one constraint key.
pub trait ConstraintValidator: Send + Sync + Debug {
    /// The constraint key this validator owns.
    fn key(&self) -> &'static str;

    /// Whether violations disqualify the candidate.
    fn constraint_type(&self) -> ConstraintType;

    /// Whether the resource is consulted.
    fn scope(&self) -> ValidatorScope;

    /// Returns a violation, or `None` when the candidate satisfies the constraint.
    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation>;

    /// Human-readable description.
    fn description(&self) -> &'static str {
        self.key()
    }
}

/// Validator lookup by constraint key.
///
/// The processor does not know how many validators exist; new keys are
/// added by registering another validator.
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<&'static str, Arc<dyn ConstraintValidator>>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Registry with every built-in validator.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_validator(TimeRangeValidator)
            .with_validator(ForbiddenTimeRangeValidator)
            .with_validator(PreferredTimeRangeValidator)
            .with_validator(PreferredWeekdaysValidator)
            .with_validator(RequiredCapacityValidator)
            .with_validator(CompatibleResourceTypesValidator)
            .with_validator(LocationPreferenceValidator)
    }

    /// Registers a validator, replacing any previous one for the same key.
    pub fn with_validator<V: ConstraintValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.insert(validator.key(), Arc::new(validator));
        self
    }

    /// Looks up the validator for a key.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn ConstraintValidator>> {
        self.validators.get(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.validators.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Violation for a payload that could not be parsed.
pub(crate) fn invalid_format(
    constraint: &ActivityConstraint,
    details: impl Into<String>,
) -> ConstraintViolation {
    ConstraintViolation::hard(&constraint.key, &constraint.value, "Invalid constraint format")
        .with_details(details)
}

/// Violation for a JSON payload that could not be parsed.
pub(crate) fn invalid_json(
    constraint: &ActivityConstraint,
    error: &serde_json::Error,
) -> ConstraintViolation {
    ConstraintViolation::hard(&constraint.key, &constraint.value, "Invalid JSON format")
        .with_details(error.to_string())
}
