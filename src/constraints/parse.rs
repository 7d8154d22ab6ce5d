//! Value parsers shared by constraint validators and preference rules.
//!
//! Lists are lenient: tokens that do not parse are dropped rather than
//! failing the whole value. Callers decide what an empty result means.

use chrono::{NaiveTime, Weekday};
use std::collections::HashSet;

use crate::models::WeeklyWindow;

/// Splits a comma-separated list into trimmed, non-empty tokens.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Parses a weekday name or three-letter abbreviation, case-insensitively.
pub fn parse_weekday(token: &str) -> Option<Weekday> {
    token.trim().parse::<Weekday>().ok()
}

/// Parses a comma-separated weekday set, dropping unknown names.
pub fn parse_weekday_set(value: &str) -> HashSet<Weekday> {
    split_list(value).filter_map(parse_weekday).collect()
}

/// Parses `HH:MM` (seconds optional).
pub fn parse_time(token: &str) -> Option<NaiveTime> {
    let token = token.trim();
    NaiveTime::parse_from_str(token, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(token, "%H:%M:%S"))
        .ok()
}

/// Parses one `"<Weekday> HH:MM-HH:MM"` entry.
///
/// Whitespace around the dash is optional. Entries whose start is not
/// strictly before their end are rejected.
pub fn parse_timerange_entry(entry: &str) -> Option<WeeklyWindow> {
    let (day, range) = entry.trim().split_once(char::is_whitespace)?;
    let weekday = parse_weekday(day)?;
    let range: String = range.chars().filter(|c| !c.is_whitespace()).collect();
    let (start, end) = range.split_once('-')?;
    let window = WeeklyWindow::new(weekday, parse_time(start)?, parse_time(end)?);
    window.is_valid().then_some(window)
}

/// Parses comma- or newline-separated timerange entries, dropping invalid ones.
pub fn parse_timerange_entries(value: &str) -> Vec<WeeklyWindow> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .filter_map(parse_timerange_entry)
        .collect()
}

/// Formats a window as `"Monday 09:30-11:00"`.
pub fn format_window(window: &WeeklyWindow) -> String {
    format!(
        "{} {}-{}",
        weekday_name(window.weekday),
        window.start.format("%H:%M"),
        window.end.format("%H:%M")
    )
}

/// Full English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
