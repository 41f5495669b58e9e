use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::date_key;

/// A project tasks can be incurred against, identified by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub code: String,
    #[serde(default)]
    pub display_label: String,
}

impl Project {
    pub fn new(code: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_label: display_label.into(),
        }
    }
}

/// One configured line of a day plan.
///
/// `raw_value` may carry a leading number of hours (a fixed assignment);
/// a non-empty `task_type_label` marks the entry as taking part in the
/// proportional share of whatever time is left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanEntry {
    pub project_index: i64,
    #[serde(default)]
    pub task_type_label: String,
    #[serde(default)]
    pub raw_value: String,
}

impl DayPlanEntry {
    pub fn new(
        project_index: i64,
        task_type_label: impl Into<String>,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            project_index,
            task_type_label: task_type_label.into(),
            raw_value: raw_value.into(),
        }
    }

    pub fn has_share_marker(&self) -> bool {
        !self.task_type_label.trim().is_empty()
    }
}

/// Task and time configuration produced outside the core.
///
/// Every field is optional on the wire; a missing map simply means no working
/// days are configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub projects: Vec<Project>,
    pub sda_common_code: String,
    pub daily_expected_hours: BTreeMap<String, String>,
    pub day_plan: BTreeMap<String, Vec<DayPlanEntry>>,
}

/// Reason a configuration cannot be used at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationProblem {
    NoProjects,
    MissingCommonCode,
}

impl std::fmt::Display for ConfigurationProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationProblem::NoProjects => write!(f, "no projects configured"),
            ConfigurationProblem::MissingCommonCode => {
                write!(f, "common project search code is empty")
            }
        }
    }
}

impl Configuration {
    /// Checks the fields without which no run can start.
    pub fn validate(&self) -> Result<(), ConfigurationProblem> {
        if self.projects.is_empty() {
            return Err(ConfigurationProblem::NoProjects);
        }
        if self.sda_common_code.trim().is_empty() {
            return Err(ConfigurationProblem::MissingCommonCode);
        }
        Ok(())
    }

    pub fn expected_hours(&self, date: NaiveDate) -> Option<&str> {
        self.daily_expected_hours
            .get(&date_key(date))
            .map(String::as_str)
    }

    pub fn entries_for(&self, date: NaiveDate) -> &[DayPlanEntry] {
        self.day_plan
            .get(&date_key(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolves a signed index from the plan into a project.
    pub fn project(&self, index: i64) -> Option<&Project> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.projects.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_configuration() {
        let raw = r#"{
            "projects": [{ "code": "PRJ-1", "displayLabel": "Billing" }],
            "dailyExpectedHours": { "2025-03-17": "8" }
        }"#;
        let config: Configuration = serde_json::from_str(raw).unwrap();
        assert_eq!(config.projects.len(), 1);
        assert!(config.day_plan.is_empty());
        assert_eq!(config.sda_common_code, "");
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(config.expected_hours(date), Some("8"));
        assert!(config.entries_for(date).is_empty());
    }

    #[test]
    fn validate_requires_projects_and_common_code() {
        let mut config = Configuration::default();
        assert_eq!(config.validate(), Err(ConfigurationProblem::NoProjects));
        config.projects.push(Project::new("PRJ-1", "Billing"));
        assert_eq!(
            config.validate(),
            Err(ConfigurationProblem::MissingCommonCode)
        );
        config.sda_common_code = "SDA-01".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_project_index_resolves_to_none() {
        let config = Configuration {
            projects: vec![Project::new("PRJ-1", "Billing")],
            ..Default::default()
        };
        assert!(config.project(-1).is_none());
        assert!(config.project(1).is_none());
        assert_eq!(config.project(0).map(|p| p.code.as_str()), Some("PRJ-1"));
    }
}
