//! Ordering of time slots by their displayed start time.
//!
//! Slot labels look like `9:00 AM to 9:45 AM`. Only the start matters for
//! ordering; labels that don't parse sort first.

use chrono::{NaiveTime, Timelike};

const LABEL_SEPARATOR: &str = " to ";
const CLOCK_FORMAT: &str = "%I:%M %p";

fn parse_clock(text: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(text.trim(), CLOCK_FORMAT).ok()?;
    Some(time.hour() * 60 + time.minute())
}

/// Minutes since midnight of the label's start time, or 0 if the label is
/// malformed.
pub fn start_minutes(label: &str) -> u32 {
    let start = label.split(LABEL_SEPARATOR).next().unwrap_or_default();
    parse_clock(start).unwrap_or(0)
}

/// Strictly parses `start to end` into minutes since midnight.
pub fn parse_label(label: &str) -> Option<(u32, u32)> {
    let (start, end) = label.split_once(LABEL_SEPARATOR)?;
    Some((parse_clock(start)?, parse_clock(end)?))
}

/// Stable ascending sort by start time.
pub fn sort_by_start<T, F>(items: &mut [T], label_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|it| start_minutes(label_of(it)));
}
