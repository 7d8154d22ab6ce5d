//! Preference rules.
//!
//! Each recognized preference key is a predicate over the candidate slot
//! plus a fixed weight multiplier. Matching rules multiply together, so two
//! preferred-weekday hits weigh 9× and a preferred plus an avoided rule
//! weigh 0.9×.
//!
//! | Key | Matches when | Multiplier |
//! |-----|--------------|-----------|
//! | `preferred_weekday` | slot weekday listed | 3.0 |
//! | `avoid_weekday` | slot weekday listed | 0.3 |
//! | `preferred_time_morning` | starts before 12:00 | 3.0 |
//! | `preferred_time_afternoon` | starts 12:00–16:59 | 2.0 |
//! | `preferred_time_evening` | starts 17:00 or later | 2.0 |
//! | `avoid_time_morning` | starts before 12:00 | 0.3 |
//! | `avoid_time_afternoon` | starts 12:00–16:59 | 0.5 |
//! | `avoid_time_evening` | starts 17:00 or later | 0.5 |
//! | `preferred_timerange` | slot nested in a same-weekday entry | 4.0 |

use crate::constraints::parse::{parse_timerange_entries, parse_weekday_set};
use crate::models::Slot;

const AFTERNOON_START_HOUR: u32 = 12;
const EVENING_START_HOUR: u32 = 17;

/// Part of the day a slot starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
}

impl DayPart {
    /// Classifies a slot by its start hour.
    pub fn of(slot: &Slot) -> Self {
        match slot.start_hour() {
            h if h < AFTERNOON_START_HOUR => DayPart::Morning,
            h if h < EVENING_START_HOUR => DayPart::Afternoon,
            _ => DayPart::Evening,
        }
    }
}

/// A recognized preference key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceRule {
    PreferredWeekday,
    AvoidWeekday,
    PreferredTime(DayPart),
    AvoidTime(DayPart),
    PreferredTimerange,
}

impl PreferenceRule {
    /// Looks up the rule for a stored key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let rule = match key {
            "preferred_weekday" => PreferenceRule::PreferredWeekday,
            "avoid_weekday" => PreferenceRule::AvoidWeekday,
            "preferred_time_morning" => PreferenceRule::PreferredTime(DayPart::Morning),
            "preferred_time_afternoon" => PreferenceRule::PreferredTime(DayPart::Afternoon),
            "preferred_time_evening" => PreferenceRule::PreferredTime(DayPart::Evening),
            "avoid_time_morning" => PreferenceRule::AvoidTime(DayPart::Morning),
            "avoid_time_afternoon" => PreferenceRule::AvoidTime(DayPart::Afternoon),
            "avoid_time_evening" => PreferenceRule::AvoidTime(DayPart::Evening),
            "preferred_timerange" => PreferenceRule::PreferredTimerange,
            _ => return None,
        };
        Some(rule)
    }

    /// Weight multiplier applied when the rule matches.
    pub fn multiplier(&self) -> f64 {
        match self {
            PreferenceRule::PreferredWeekday => 3.0,
            PreferenceRule::AvoidWeekday => 0.3,
            PreferenceRule::PreferredTime(DayPart::Morning) => 3.0,
            PreferenceRule::PreferredTime(DayPart::Afternoon) => 2.0,
            PreferenceRule::PreferredTime(DayPart::Evening) => 2.0,
            PreferenceRule::AvoidTime(DayPart::Morning) => 0.3,
            PreferenceRule::AvoidTime(DayPart::Afternoon) => 0.5,
            PreferenceRule::AvoidTime(DayPart::Evening) => 0.5,
            PreferenceRule::PreferredTimerange => 4.0,
        }
    }

    /// Whether the rule, with its stored value, matches the slot.
    ///
    /// Time-of-day rules ignore the value.
    pub fn matches(&self, value: &str, slot: &Slot) -> bool {
        match self {
            PreferenceRule::PreferredWeekday | PreferenceRule::AvoidWeekday => {
                parse_weekday_set(value).contains(&slot.weekday)
            }
            PreferenceRule::PreferredTime(part) | PreferenceRule::AvoidTime(part) => {
                DayPart::of(slot) == *part
            }
            PreferenceRule::PreferredTimerange => {
                let window = slot.window();
                parse_timerange_entries(value)
                    .iter()
                    .any(|entry| entry.contains(&window))
            }
        }
    }
}
