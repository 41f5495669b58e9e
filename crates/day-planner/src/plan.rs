use autoincur_core_types::{Configuration, PlannedTask, TaskType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocator::{allocate_detailed, Allocation};

/// Ordered tasks for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub tasks: Vec<PlannedTask>,
    pub allocation: Allocation,
}

impl DayPlan {
    pub fn total_minutes(&self) -> u32 {
        self.tasks.iter().map(PlannedTask::total_minutes).sum()
    }

    pub fn is_working_day(&self) -> bool {
        !self.tasks.is_empty()
    }
}

/// Builds the day plan for `date` from the configuration.
pub fn day_plan(date: NaiveDate, config: &Configuration) -> DayPlan {
    let entries = config.entries_for(date);
    let allocation = allocate_detailed(
        date,
        entries,
        &config.projects,
        config.expected_hours(date),
    );

    let mut tasks: Vec<PlannedTask> = allocation
        .assignments
        .iter()
        .map(|assignment| {
            let project = &config.projects[assignment.project_index];
            let task_type = entries
                .iter()
                .filter(|entry| entry.project_index == assignment.project_index as i64)
                .find(|entry| entry.has_share_marker())
                .map(|entry| TaskType::from_label(&entry.task_type_label))
                .unwrap_or_default();
            PlannedTask::new(task_type, project.code.clone(), assignment.total_minutes())
        })
        .collect();

    // Stable: projects keep their configured order within one task type.
    tasks.sort_by(|a, b| a.task_type.cmp(&b.task_type));
    debug!(%date, tasks = tasks.len(), "resolved day plan");

    DayPlan {
        date,
        tasks,
        allocation,
    }
}

/// Planned tasks for `date`, in incurring order.
pub fn planned_tasks(date: NaiveDate, config: &Configuration) -> Vec<PlannedTask> {
    day_plan(date, config).tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoincur_core_types::{date_key, DayPlanEntry, Project};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()
    }

    fn config_with(entries: Vec<DayPlanEntry>, projects: usize, hours: &str) -> Configuration {
        let mut config = Configuration {
            projects: (0..projects)
                .map(|i| Project::new(format!("PRJ-{i}"), format!("Project {i}")))
                .collect(),
            sda_common_code: "SDA-01".into(),
            ..Default::default()
        };
        config
            .daily_expected_hours
            .insert(date_key(date()), hours.to_string());
        config.day_plan.insert(date_key(date()), entries);
        config
    }

    #[test]
    fn tasks_follow_type_precedence_not_project_order() {
        let config = config_with(
            vec![
                DayPlanEntry::new(0, "Despliegue", ""),
                DayPlanEntry::new(1, "Construcción", ""),
                DayPlanEntry::new(2, "Diseño", ""),
            ],
            3,
            "6",
        );
        let names: Vec<_> = planned_tasks(date(), &config)
            .into_iter()
            .map(|task| (task.task_type, task.project_code))
            .collect();
        assert_eq!(
            names,
            vec![
                (TaskType::Design, "PRJ-2".to_string()),
                (TaskType::Build, "PRJ-1".to_string()),
                (TaskType::Deploy, "PRJ-0".to_string()),
            ]
        );
    }

    #[test]
    fn fixed_only_projects_default_to_build() {
        let config = config_with(vec![DayPlanEntry::new(0, "", "3")], 1, "8");
        let tasks = planned_tasks(date(), &config);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_type, TaskType::Build);
        assert_eq!(tasks[0].total_minutes(), 180);
    }

    #[test]
    fn plan_for_unconfigured_day_is_empty() {
        let config = config_with(vec![DayPlanEntry::new(0, "Diseño", "")], 1, "8");
        let other = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
        let plan = day_plan(other, &config);
        assert!(!plan.is_working_day());
        assert_eq!(plan.total_minutes(), 0);
    }
}
