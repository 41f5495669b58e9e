//! Incurring loop: submits a day's planned tasks one at a time.

use std::time::Duration;

use autoincur_core_types::{last_clock_in, PlannedTask};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::FlowError;
use crate::notify::{Notifier, Severity};
use crate::timesheet::Timesheet;
use crate::wizard::TaskWizard;

/// Allowed gap between planned and incurred totals, in minutes.
pub const TOLERANCE_MINUTES: u32 = 1;

const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// What to do with a task given the time its option already shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Skip,
    Create,
    Modify,
}

pub fn reconcile(existing_minutes: Option<u32>, planned_minutes: u32) -> Disposition {
    match existing_minutes {
        Some(existing) if existing == planned_minutes => Disposition::Skip,
        Some(0) | None => Disposition::Create,
        Some(_) => Disposition::Modify,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum TaskStatus {
    /// Nothing planned for this task.
    Empty,
    AlreadyIncurred,
    Created,
    Modified,
    CreatedByWizard,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task: PlannedTask,
    pub status: TaskStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub planned_minutes: u32,
    pub initial_minutes: u32,
    pub final_minutes: u32,
    pub tasks: Vec<TaskOutcome>,
}

impl DayReport {
    pub fn within_tolerance(&self) -> bool {
        self.final_minutes.abs_diff(self.planned_minutes) <= TOLERANCE_MINUTES
    }

    pub fn failed_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|outcome| matches!(outcome.status, TaskStatus::Failed(_)))
            .count()
    }

    /// Mismatch against the plan, if any.
    pub fn discrepancy(&self) -> Option<FlowError> {
        (!self.within_tolerance()).then(|| FlowError::ReconciliationMismatch {
            planned: self.planned_minutes,
            actual: self.final_minutes,
        })
    }
}

pub struct IncurringLoop<'a> {
    sheet: &'a Timesheet,
    wizard: TaskWizard<'a>,
    notifier: &'a dyn Notifier,
}

impl<'a> IncurringLoop<'a> {
    pub fn new(sheet: &'a Timesheet, wizard: TaskWizard<'a>, notifier: &'a dyn Notifier) -> Self {
        Self {
            sheet,
            wizard,
            notifier,
        }
    }

    /// Incurs `tasks` on the date the page currently shows.
    ///
    /// Per-task failures are notified and skipped; the loop never rolls back
    /// what it already submitted. The day's outcome is left to the caller.
    #[instrument(skip_all, fields(date = %date, tasks = tasks.len()))]
    pub async fn run(&self, date: NaiveDate, tasks: &[PlannedTask]) -> Result<DayReport, FlowError> {
        let planned_minutes: u32 = tasks.iter().map(PlannedTask::total_minutes).sum();
        let initial_minutes = self.sheet.incurred_minutes().await?;

        if initial_minutes >= planned_minutes {
            info!(initial_minutes, planned_minutes, "day already incurred");
            return Ok(DayReport {
                date,
                planned_minutes,
                initial_minutes,
                final_minutes: initial_minutes,
                tasks: tasks
                    .iter()
                    .map(|task| TaskOutcome {
                        task: task.clone(),
                        status: TaskStatus::AlreadyIncurred,
                    })
                    .collect(),
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let status = if task.total_minutes() == 0 {
                TaskStatus::Empty
            } else {
                match self.incur_task(task).await {
                    Ok(status) => status,
                    Err(err) => {
                        warn!(task = %task, %err, "task failed");
                        self.notifier.notify(
                            &format!("{} {}: {}", task.name, task.project_code, err),
                            Severity::Error,
                            Some(NOTICE_DURATION),
                        );
                        TaskStatus::Failed(err.to_string())
                    }
                }
            };
            debug!(task = %task, ?status, "task processed");
            outcomes.push(TaskOutcome {
                task: task.clone(),
                status,
            });
        }

        let final_minutes = self.sheet.incurred_minutes().await?;
        let report = DayReport {
            date,
            planned_minutes,
            initial_minutes,
            final_minutes,
            tasks: outcomes,
        };

        if let Some(mismatch) = report.discrepancy() {
            warn!(%mismatch, "incurred total differs from plan");
        }
        Ok(report)
    }

    async fn incur_task(&self, task: &PlannedTask) -> Result<TaskStatus, FlowError> {
        let before = self.sheet.incurred_minutes().await?;

        let Some(option) = self.sheet.find_task_option(task).await? else {
            info!(task = %task, "task option missing, starting wizard");
            self.sheet.close_task_selector().await?;
            self.wizard.create(task).await?;
            self.sheet.wait_incurred_change(before).await?;
            return Ok(TaskStatus::CreatedByWizard);
        };

        let existing = last_clock_in(&option.text);
        let disposition = reconcile(existing, task.total_minutes());
        debug!(task = %task, ?existing, ?disposition, "reconciled option");
        let (button, status) = match disposition {
            Disposition::Skip => {
                self.sheet.close_task_selector().await?;
                return Ok(TaskStatus::AlreadyIncurred);
            }
            Disposition::Create => (&self.sheet.selectors().create_button, TaskStatus::Created),
            Disposition::Modify => (&self.sheet.selectors().modify_button, TaskStatus::Modified),
        };

        let selectors = self.sheet.selectors();
        self.sheet
            .select_option(&option, &task.option_markers())
            .await?;
        self.sheet
            .enter_time(&selectors.hours_input, &selectors.minutes_input, task)
            .await?;
        self.sheet
            .press(button, &[], self.sheet.timeouts().element())
            .await?;
        self.sheet.wait_incurred_change(before).await?;
        Ok(status)
    }
}
