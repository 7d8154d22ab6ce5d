//! Slot-scoped validators: time windows and weekdays.

use serde::Deserialize;

use super::parse::{
    format_window, parse_time, parse_timerange_entries, parse_weekday_set, weekday_name,
};
use super::{
    invalid_format, invalid_json, CandidateContext, ConstraintValidator, ValidatorScope,
    FORBIDDEN_TIMERANGE, PREFERRED_TIMERANGE, PREFERRED_WEEKDAYS, TIME_RANGE,
};
use crate::models::{ActivityConstraint, ConstraintType, ConstraintViolation};

#[derive(Debug, Deserialize)]
struct TimeRangeValue {
    start: String,
    end: String,
}

/// `time_range`: `{"start":"HH:MM","end":"HH:MM"}`.
///
/// The slot must lie fully inside the range on any weekday.
#[derive(Debug, Clone, Copy)]
pub struct TimeRangeValidator;

impl ConstraintValidator for TimeRangeValidator {
    fn key(&self) -> &'static str {
        TIME_RANGE
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Hard
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Slot
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let value: TimeRangeValue = match serde_json::from_str(&constraint.value) {
            Ok(value) => value,
            Err(e) => return Some(invalid_json(constraint, &e)),
        };
        let (Some(start), Some(end)) = (parse_time(&value.start), parse_time(&value.end)) else {
            return Some(invalid_format(
                constraint,
                format!("unparsable times '{}' / '{}'", value.start, value.end),
            ));
        };

        let slot = candidate.slot;
        if slot.is_within(start, end) {
            return None;
        }
        Some(ConstraintViolation::hard(
            &constraint.key,
            &constraint.value,
            format!(
                "Slot {}-{} is outside the allowed time range {}-{}",
                slot.start_time.format("%H:%M"),
                slot.end_time.format("%H:%M"),
                start.format("%H:%M"),
                end.format("%H:%M"),
            ),
        ))
    }

    fn description(&self) -> &'static str {
        "Slot must lie within a daily time range"
    }
}

/// `forbidden_timerange`: `"<Weekday> HH:MM-HH:MM"` entries.
///
/// Any intersection with a same-weekday entry disqualifies the slot.
/// Unparsable entries are ignored.
#[derive(Debug, Clone, Copy)]
pub struct ForbiddenTimeRangeValidator;

impl ConstraintValidator for ForbiddenTimeRangeValidator {
    fn key(&self) -> &'static str {
        FORBIDDEN_TIMERANGE
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Hard
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Slot
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let slot = candidate.slot.window();
        parse_timerange_entries(&constraint.value)
            .into_iter()
            .find(|entry| entry.overlaps(&slot))
            .map(|entry| {
                ConstraintViolation::hard(
                    &constraint.key,
                    &constraint.value,
                    format!("Slot overlaps forbidden time range {}", format_window(&entry)),
                )
            })
    }

    fn description(&self) -> &'static str {
        "Slot must not intersect forbidden weekly windows"
    }
}

/// `preferred_timerange`: `"<Weekday> HH:MM-HH:MM"` entries.
///
/// Soft: the slot should nest inside one of its weekday's entries.
#[derive(Debug, Clone, Copy)]
pub struct PreferredTimeRangeValidator;

impl ConstraintValidator for PreferredTimeRangeValidator {
    fn key(&self) -> &'static str {
        PREFERRED_TIMERANGE
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Soft
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Slot
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let slot = candidate.slot.window();
        let same_day: Vec<_> = parse_timerange_entries(&constraint.value)
            .into_iter()
            .filter(|entry| entry.weekday == slot.weekday)
            .collect();

        if same_day.is_empty() {
            return Some(ConstraintViolation::soft(
                &constraint.key,
                &constraint.value,
                format!(
                    "No preferred ranges for this weekday ({})",
                    weekday_name(slot.weekday)
                ),
            ));
        }
        if same_day.iter().any(|entry| entry.contains(&slot)) {
            return None;
        }
        Some(ConstraintViolation::soft(
            &constraint.key,
            &constraint.value,
            format!("Slot {} is outside the preferred time ranges", format_window(&slot)),
        ))
    }

    fn description(&self) -> &'static str {
        "Slot should lie within a preferred weekly window"
    }
}

/// `preferred_weekdays`: comma-separated weekday names.
#[derive(Debug, Clone, Copy)]
pub struct PreferredWeekdaysValidator;

impl ConstraintValidator for PreferredWeekdaysValidator {
    fn key(&self) -> &'static str {
        PREFERRED_WEEKDAYS
    }

    fn constraint_type(&self) -> ConstraintType {
        ConstraintType::Soft
    }

    fn scope(&self) -> ValidatorScope {
        ValidatorScope::Slot
    }

    fn validate(
        &self,
        constraint: &ActivityConstraint,
        candidate: &CandidateContext<'_>,
    ) -> Option<ConstraintViolation> {
        let preferred = parse_weekday_set(&constraint.value);
        if preferred.is_empty() {
            return Some(invalid_format(constraint, "no recognizable weekday names"));
        }
        let weekday = candidate.slot.weekday;
        if preferred.contains(&weekday) {
            return None;
        }
        Some(ConstraintViolation::soft(
            &constraint.key,
            &constraint.value,
            format!("{} is not a preferred weekday", weekday_name(weekday)),
        ))
    }

    fn description(&self) -> &'static str {
        "Slot should fall on a preferred weekday"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Slot};
    use chrono::{NaiveTime, Weekday};
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn activity() -> Activity {
        Activity::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    fn slot(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Slot {
        Slot::new(Uuid::new_v4(), weekday, start, end)
    }

    fn constraint(activity: &Activity, key: &str, value: &str) -> ActivityConstraint {
        ActivityConstraint::new(activity.organization_id, activity.id, key, value)
    }

    fn check(
        validator: &dyn ConstraintValidator,
        value: &str,
        slot: &Slot,
    ) -> Option<ConstraintViolation> {
        let act = activity();
        let c = constraint(&act, validator.key(), value);
        validator.validate(&c, &CandidateContext::slot_only(&act, slot))
    }

    #[test]
    fn test_time_range_inside() {
        let s = slot(Weekday::Mon, t(9, 0), t(10, 0));
        assert!(check(&TimeRangeValidator, r#"{"start":"08:00","end":"17:00"}"#, &s).is_none());
    }

    #[test]
    fn test_time_range_boundaries_inclusive() {
        let s = slot(Weekday::Mon, t(8, 0), t(17, 0));
        assert!(check(&TimeRangeValidator, r#"{"start":"08:00","end":"17:00"}"#, &s).is_none());
    }

    #[test]
    fn test_time_range_outside_is_hard() {
        let s = slot(Weekday::Mon, t(7, 0), t(9, 0));
        let v = check(&TimeRangeValidator, r#"{"start":"08:00","end":"17:00"}"#, &s).unwrap();
        assert!(v.is_hard());
        assert_eq!(v.key, TIME_RANGE);
        assert!(v.message.contains("outside"));
    }

    #[test]
    fn test_time_range_bad_json() {
        let s = slot(Weekday::Mon, t(9, 0), t(10, 0));
        let v = check(&TimeRangeValidator, "08:00-17:00", &s).unwrap();
        assert!(v.is_hard());
        assert_eq!(v.message, "Invalid JSON format");
        assert!(v.details.is_some());
    }

    #[test]
    fn test_time_range_bad_times() {
        let s = slot(Weekday::Mon, t(9, 0), t(10, 0));
        let v = check(&TimeRangeValidator, r#"{"start":"8am","end":"17:00"}"#, &s).unwrap();
        assert_eq!(v.message, "Invalid constraint format");
    }

    #[test]
    fn test_forbidden_overlap_same_weekday() {
        let s = slot(Weekday::Mon, t(9, 0), t(10, 0));
        let v = check(&ForbiddenTimeRangeValidator, "Monday 09:30 - 11:00", &s).unwrap();
        assert!(v.is_hard());
        assert!(v.message.contains("Monday 09:30-11:00"));
    }

    #[test]
    fn test_forbidden_other_weekday() {
        let s = slot(Weekday::Tue, t(9, 30), t(11, 0));
        assert!(check(&ForbiddenTimeRangeValidator, "Monday 09:30 - 11:00", &s).is_none());
    }

    #[test]
    fn test_forbidden_touching_is_allowed() {
        let s = slot(Weekday::Mon, t(11, 0), t(12, 0));
        assert!(check(&ForbiddenTimeRangeValidator, "Monday 09:30-11:00", &s).is_none());
    }

    #[test]
    fn test_forbidden_ignores_bad_entries() {
        let s = slot(Weekday::Fri, t(14, 0), t(15, 0));
        assert!(check(&ForbiddenTimeRangeValidator, "Friday 16:00-14:00, garbage", &s).is_none());
        assert!(check(
            &ForbiddenTimeRangeValidator,
            "garbage\nFriday 14:30-16:00",
            &s
        )
        .is_some());
    }

    #[test]
    fn test_preferred_range_nested() {
        let s = slot(Weekday::Wed, t(9, 0), t(10, 0));
        assert!(check(
            &PreferredTimeRangeValidator,
            "Wednesday 08:00-12:00, Thursday 13:00-15:00",
            &s
        )
        .is_none());
    }

    #[test]
    fn test_preferred_range_partial_overlap_is_soft() {
        let s = slot(Weekday::Wed, t(11, 0), t(13, 0));
        let v = check(&PreferredTimeRangeValidator, "Wednesday 08:00-12:00", &s).unwrap();
        assert!(!v.is_hard());
        assert!(v.message.contains("outside"));
    }

    #[test]
    fn test_preferred_range_no_entries_for_weekday() {
        let s = slot(Weekday::Sat, t(9, 0), t(10, 0));
        let v = check(&PreferredTimeRangeValidator, "Wednesday 08:00-12:00", &s).unwrap();
        assert!(!v.is_hard());
        assert!(v.message.starts_with("No preferred ranges for this weekday"));
    }

    #[test]
    fn test_preferred_weekdays() {
        let tue = slot(Weekday::Tue, t(9, 0), t(10, 0));
        let v = check(&PreferredWeekdaysValidator, "Monday,Wednesday", &tue).unwrap();
        assert!(!v.is_hard());
        assert!(v.message.contains("Tuesday"));

        let wed = slot(Weekday::Wed, t(9, 0), t(10, 0));
        assert!(check(&PreferredWeekdaysValidator, "monday, WEDNESDAY", &wed).is_none());
    }

    #[test]
    fn test_preferred_weekdays_unparsable() {
        let s = slot(Weekday::Tue, t(9, 0), t(10, 0));
        let v = check(&PreferredWeekdaysValidator, " , nope", &s).unwrap();
        assert!(v.is_hard());
        assert_eq!(v.message, "Invalid constraint format");
    }
}
