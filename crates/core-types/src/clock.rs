//! Parsing and formatting of the `HH:MM` values the timesheet renders.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::TypesError;

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3}):([0-5]\d)").unwrap());

/// Parses a whole `H:MM` value into minutes.
pub fn parse_clock(text: &str) -> Result<u32, TypesError> {
    let trimmed = text.trim();
    let caps = CLOCK_RE
        .captures(trimmed)
        .filter(|caps| caps.get(0).map(|m| m.as_str()) == Some(trimmed))
        .ok_or_else(|| TypesError::InvalidClock(text.to_string()))?;
    Ok(clock_minutes(&caps))
}

/// Minutes of the last `H:MM` occurrence inside a longer label.
///
/// Task options render the amount already incurred at the end of their text,
/// after the task name and project code.
pub fn last_clock_in(text: &str) -> Option<u32> {
    CLOCK_RE
        .captures_iter(text)
        .last()
        .map(|caps| clock_minutes(&caps))
}

pub fn format_clock(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

fn clock_minutes(caps: &regex::Captures<'_>) -> u32 {
    let hours: u32 = caps[1].parse().unwrap_or(0);
    let minutes: u32 = caps[2].parse().unwrap_or(0);
    hours * 60 + minutes
}
