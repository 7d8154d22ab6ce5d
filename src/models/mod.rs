//! Matching domain models.
//!
//! Entities (activities, slots, resources, constraints, preferences) are
//! owned by entity management and read-only here. Assignments are written
//! only by the matching strategies.
//!
//! # Domain Mappings
//!
//! | u-matching | University | Clinic | Coworking |
//! |------------|------------|--------|-----------|
//! | Activity | Course section | Appointment series | Team booking |
//! | Slot | Weekly timetable period | Weekly clinic hour | Weekly booking window |
//! | Resource | Classroom / Lab | Exam room | Meeting room |
//! | Assignment | Timetable entry | Room booking | Reservation |

mod activity;
mod calendar;
mod constraint;
mod resource;
mod schedule;
mod violation;

pub use activity::Activity;
pub use calendar::{Slot, WeeklyWindow};
pub use constraint::{ActivityConstraint, UserPreference};
pub use resource::{Resource, ResourceType};
pub use schedule::{Assignment, MatchingMode, SchedulingRequest, SchedulingResult, SlotResourcePair};
pub use violation::{ConstraintType, ConstraintViolation, ViolationSeverity};
