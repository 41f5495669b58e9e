use std::collections::{BTreeMap, BTreeSet};

use autoincur_core_types::{DayPlanEntry, Project};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").unwrap());

/// Minutes assigned to one project for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedAssignment {
    pub project_index: usize,
    pub hours: u32,
    pub minutes: u32,
}

impl ComputedAssignment {
    fn from_minutes(project_index: usize, total: u32) -> Self {
        Self {
            project_index,
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

/// Full breakdown of one allocation, kept for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub expected_minutes: f64,
    pub fixed_minutes: f64,
    pub remaining_minutes: f64,
    pub share_participants: usize,
    pub overcommitted: bool,
    pub assignments: Vec<ComputedAssignment>,
}

impl Allocation {
    pub fn assigned_minutes(&self) -> u32 {
        self.assignments.iter().map(|a| a.total_minutes()).sum()
    }
}

/// Leading numeric quantity of hours in a configured value.
///
/// Accepts a comma as decimal separator. Returns `None` for blank or
/// non-numeric input.
pub fn parse_hours(raw: &str) -> Option<f64> {
    let caps = LEADING_NUMBER_RE.captures(raw)?;
    caps[1].replace(',', ".").parse::<f64>().ok()
}

/// Per-project minute assignments for `date`.
///
/// Returns an empty list for non-working days (expected hours absent, blank,
/// non-numeric or zero).
pub fn allocate(
    date: NaiveDate,
    entries: &[DayPlanEntry],
    projects: &[Project],
    expected_hours: Option<&str>,
) -> Vec<ComputedAssignment> {
    allocate_detailed(date, entries, projects, expected_hours).assignments
}

pub fn allocate_detailed(
    date: NaiveDate,
    entries: &[DayPlanEntry],
    projects: &[Project],
    expected_hours: Option<&str>,
) -> Allocation {
    let Some(expected) = expected_hours
        .and_then(parse_hours)
        .filter(|hours| *hours > 0.0)
    else {
        debug!(%date, raw = ?expected_hours, "non-working day; nothing to allocate");
        return Allocation::default();
    };
    let expected_minutes = expected * 60.0;

    let mut fixed: BTreeMap<usize, f64> = BTreeMap::new();
    let mut sharing: BTreeSet<usize> = BTreeSet::new();

    for entry in entries {
        let index = match usize::try_from(entry.project_index) {
            Ok(index) if index < projects.len() => index,
            _ => {
                warn!(
                    %date,
                    project_index = entry.project_index,
                    projects = projects.len(),
                    "day plan references an unknown project; entry skipped"
                );
                continue;
            }
        };

        // A numeric quantity always wins over the share marker.
        if let Some(hours) = parse_hours(&entry.raw_value) {
            *fixed.entry(index).or_insert(0.0) += hours * 60.0;
        } else if entry.has_share_marker() {
            sharing.insert(index);
        } else {
            debug!(%date, project_index = index, "entry has neither quantity nor task type");
        }
    }

    let fixed_minutes: f64 = fixed.values().sum();
    let mut remaining_minutes = expected_minutes - fixed_minutes;
    let overcommitted = remaining_minutes < 0.0;
    if overcommitted {
        warn!(
            %date,
            expected_minutes,
            fixed_minutes,
            "fixed assignments exceed the expected day total; share pool is empty"
        );
        remaining_minutes = 0.0;
    }

    let share = if sharing.is_empty() {
        0.0
    } else {
        remaining_minutes / sharing.len() as f64
    };

    let mut exact: BTreeMap<usize, f64> = fixed;
    for index in &sharing {
        *exact.entry(*index).or_insert(0.0) += share;
    }

    // Round the running total instead of each value so the day stays within a
    // minute of its exact sum.
    let mut assignments = Vec::with_capacity(exact.len());
    let mut cumulative = 0.0;
    let mut previous_rounded = 0.0;
    for (index, minutes) in exact {
        cumulative += minutes;
        let rounded = cumulative.round();
        let assigned = (rounded - previous_rounded).max(0.0) as u32;
        previous_rounded = rounded;
        if assigned == 0 {
            debug!(%date, project_index = index, "project rounds to zero minutes; omitted");
            continue;
        }
        assignments.push(ComputedAssignment::from_minutes(index, assigned));
    }

    Allocation {
        expected_minutes,
        fixed_minutes,
        remaining_minutes,
        share_participants: sharing.len(),
        overcommitted,
        assignments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()
    }

    fn projects(count: usize) -> Vec<Project> {
        (0..count)
            .map(|i| Project::new(format!("PRJ-{i}"), format!("Project {i}")))
            .collect()
    }

    fn minutes_by_project(assignments: &[ComputedAssignment]) -> Vec<(usize, u32)> {
        assignments
            .iter()
            .map(|a| (a.project_index, a.total_minutes()))
            .collect()
    }

    #[test]
    fn fixed_entry_and_two_share_entries() {
        let entries = vec![
            DayPlanEntry::new(0, "", "3"),
            DayPlanEntry::new(1, "Construcción", ""),
            DayPlanEntry::new(2, "Pruebas", ""),
        ];
        let result = allocate(day(), &entries, &projects(3), Some("8"));
        assert_eq!(
            minutes_by_project(&result),
            vec![(0, 180), (1, 150), (2, 150)]
        );
        assert_eq!(result[1].hours, 2);
        assert_eq!(result[1].minutes, 30);
    }

    #[test]
    fn numeric_quantity_takes_precedence_over_share_marker() {
        let entries = vec![
            DayPlanEntry::new(0, "Diseño", "2"),
            DayPlanEntry::new(1, "Construcción", ""),
        ];
        let allocation = allocate_detailed(day(), &entries, &projects(2), Some("8"));
        assert_eq!(allocation.share_participants, 1);
        assert_eq!(
            minutes_by_project(&allocation.assignments),
            vec![(0, 120), (1, 360)]
        );
    }

    #[test]
    fn non_working_days_allocate_nothing() {
        let entries = vec![DayPlanEntry::new(0, "Diseño", "")];
        for expected in [None, Some(""), Some("libre"), Some("0")] {
            assert!(allocate(day(), &entries, &projects(1), expected).is_empty());
        }
    }

    #[test]
    fn overcommitment_clamps_share_pool_to_zero() {
        let entries = vec![
            DayPlanEntry::new(0, "", "6"),
            DayPlanEntry::new(1, "", "4"),
            DayPlanEntry::new(2, "Pruebas", ""),
        ];
        let allocation = allocate_detailed(day(), &entries, &projects(3), Some("8"));
        assert!(allocation.overcommitted);
        assert_eq!(allocation.remaining_minutes, 0.0);
        assert_eq!(
            minutes_by_project(&allocation.assignments),
            vec![(0, 360), (1, 240)]
        );
    }

    #[test]
    fn invalid_project_indexes_are_skipped() {
        let entries = vec![
            DayPlanEntry::new(7, "", "2"),
            DayPlanEntry::new(-1, "Diseño", ""),
            DayPlanEntry::new(0, "Diseño", ""),
        ];
        let result = allocate(day(), &entries, &projects(1), Some("8"));
        assert_eq!(minutes_by_project(&result), vec![(0, 480)]);
    }

    #[test]
    fn share_total_is_conserved_within_a_minute() {
        let cases: &[(&str, usize, &[&str])] = &[
            ("7.5", 7, &[]),
            ("8", 3, &["1.25"]),
            ("6,5", 6, &["0.4", "1"]),
            ("9", 11, &["2.33"]),
        ];
        for (expected, sharers, fixed) in cases {
            let total_projects = sharers + fixed.len();
            let mut entries: Vec<DayPlanEntry> = fixed
                .iter()
                .enumerate()
                .map(|(i, raw)| DayPlanEntry::new(i as i64, "", *raw))
                .collect();
            for i in fixed.len()..total_projects {
                entries.push(DayPlanEntry::new(i as i64, "Construcción", ""));
            }
            let allocation =
                allocate_detailed(day(), &entries, &projects(total_projects), Some(expected));
            let expected_minutes = allocation.expected_minutes;
            let assigned = allocation.assigned_minutes() as f64;
            assert!(
                (assigned - expected_minutes).abs() <= 1.0,
                "expected {expected_minutes} got {assigned} for {expected}"
            );
            for assignment in &allocation.assignments {
                assert!(assignment.minutes < 60);
            }
        }
    }

    #[test]
    fn parses_leading_quantities() {
        assert_eq!(parse_hours("3"), Some(3.0));
        assert_eq!(parse_hours(" 1,5h"), Some(1.5));
        assert_eq!(parse_hours("2.25 horas"), Some(2.25));
        assert_eq!(parse_hours("h3"), None);
        assert_eq!(parse_hours(""), None);
    }
}
