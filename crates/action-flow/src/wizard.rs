//! Task creation wizard
//!
//! Used when the task selector has no option for a planned task. Eight steps
//! run in order; step 7 (technology) is reached only through an explicit
//! transition guard on the category picked in step 5. The first failing step
//! aborts the whole creation: there is no per-step retry and no resume.

use std::fmt;

use action_primitives::{open_and_find_option, press_when_ready};
use autoincur_core_types::PlannedTask;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::FlowError;
use crate::timesheet::Timesheet;

/// Internal task categories offered by the wizard's type selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Design,
    Construction,
    Testing,
    Deployment,
}

impl TaskCategory {
    /// Label of the category in the wizard's selector.
    pub fn display_label(self) -> &'static str {
        match self {
            TaskCategory::Design => "Diseño",
            TaskCategory::Construction => "Construcción",
            TaskCategory::Testing => "Pruebas",
            TaskCategory::Deployment => "Despliegue",
        }
    }

    /// Only construction tasks carry a technology.
    pub fn requires_technology(self) -> bool {
        matches!(self, TaskCategory::Construction)
    }
}

impl Default for TaskCategory {
    fn default() -> Self {
        TaskCategory::Construction
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardSettings {
    pub category: TaskCategory,
    pub technology_label: String,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            category: TaskCategory::Construction,
            technology_label: "Java".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardState {
    OpenEntry,
    ChooseCodedProjects,
    SearchProject,
    PickProject,
    PickTaskType,
    PickFeature { category: TaskCategory },
    PickTechnology { category: TaskCategory },
    EnterTime,
    Done,
}

impl WizardState {
    pub fn step(&self) -> u8 {
        match self {
            WizardState::OpenEntry => 1,
            WizardState::ChooseCodedProjects => 2,
            WizardState::SearchProject => 3,
            WizardState::PickProject => 4,
            WizardState::PickTaskType => 5,
            WizardState::PickFeature { .. } => 6,
            WizardState::PickTechnology { .. } => 7,
            WizardState::EnterTime => 8,
            WizardState::Done => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardState::OpenEntry => "open new task",
            WizardState::ChooseCodedProjects => "choose projects with code",
            WizardState::SearchProject => "search project",
            WizardState::PickProject => "pick project",
            WizardState::PickTaskType => "pick task type",
            WizardState::PickFeature { .. } => "pick feature",
            WizardState::PickTechnology { .. } => "pick technology",
            WizardState::EnterTime => "enter time",
            WizardState::Done => "done",
        }
    }
}

/// State of one creation attempt; dropped when the attempt ends.
#[derive(Clone, Debug)]
pub struct WizardContext {
    pub state: WizardState,
    pub last_selected_category: Option<TaskCategory>,
    pub pending_task: PlannedTask,
    /// Steps that actually ran, in order.
    pub visited: Vec<u8>,
}

impl WizardContext {
    pub fn new(pending_task: PlannedTask) -> Self {
        Self {
            state: WizardState::OpenEntry,
            last_selected_category: None,
            pending_task,
            visited: Vec::new(),
        }
    }
}

pub struct TaskWizard<'a> {
    sheet: &'a Timesheet,
    settings: &'a WizardSettings,
    common_code: &'a str,
}

impl<'a> TaskWizard<'a> {
    pub fn new(sheet: &'a Timesheet, settings: &'a WizardSettings, common_code: &'a str) -> Self {
        Self {
            sheet,
            settings,
            common_code,
        }
    }

    /// Creates `task` in the timesheet and incurs its time.
    #[instrument(skip_all, fields(task = %task.name, project = %task.project_code))]
    pub async fn create(&self, task: &PlannedTask) -> Result<WizardContext, FlowError> {
        let mut ctx = WizardContext::new(task.clone());
        while ctx.state != WizardState::Done {
            let step = ctx.state.step();
            debug!(step, name = ctx.state.name(), "wizard step");
            match self.run_step(&mut ctx).await {
                Ok(next) => {
                    ctx.visited.push(step);
                    ctx.state = next;
                }
                Err(err) => {
                    return Err(FlowError::WizardStepFailure {
                        step,
                        name: ctx.state.name().to_string(),
                        reason: err.to_string(),
                    })
                }
            }
        }
        info!("task created through wizard");
        Ok(ctx)
    }

    async fn run_step(&self, ctx: &mut WizardContext) -> Result<WizardState, FlowError> {
        let selectors = self.sheet.selectors();
        let page = self.sheet.page();
        let waiter = self.sheet.waiter();
        let timeout = self.sheet.timeouts().wizard_step();

        let next = match ctx.state.clone() {
            WizardState::OpenEntry => {
                self.press(&selectors.new_task_button, &[]).await?;
                WizardState::ChooseCodedProjects
            }
            WizardState::ChooseCodedProjects => {
                self.press(&selectors.coded_projects_button, &[]).await?;
                WizardState::SearchProject
            }
            WizardState::SearchProject => {
                let input = waiter
                    .interactable(page, &selectors.project_search_input, &[], None, timeout)
                    .await?;
                page.fill(&input, self.common_code).await?;
                page.press_enter(&input).await?;
                WizardState::PickProject
            }
            WizardState::PickProject => {
                let option = open_and_find_option(
                    page,
                    waiter,
                    &selectors.project_results_trigger,
                    &selectors.project_results_option,
                    &[self.common_code],
                    timeout,
                )
                .await?;
                page.press(&option).await?;
                self.press(&selectors.project_results_confirm, &[]).await?;
                WizardState::PickTaskType
            }
            WizardState::PickTaskType => {
                let category = self.settings.category;
                let option = open_and_find_option(
                    page,
                    waiter,
                    &selectors.task_type_trigger,
                    &selectors.task_type_option,
                    &[category.display_label()],
                    timeout,
                )
                .await?;
                page.press(&option).await?;
                ctx.last_selected_category = Some(category);
                self.press(&selectors.task_type_submit, &[]).await?;
                WizardState::PickFeature { category }
            }
            WizardState::PickFeature { category } => {
                let code = ctx.pending_task.project_code.as_str();
                self.press(&selectors.feature_trigger, &[]).await?;
                let filter = waiter
                    .interactable(page, &selectors.feature_filter_input, &[], None, timeout)
                    .await?;
                page.fill(&filter, code).await?;
                let option = waiter
                    .element(page, &selectors.feature_option, &[code], None, timeout)
                    .await?;
                page.press(&option).await?;
                self.press(&selectors.feature_confirm, &[]).await?;
                if category.requires_technology() {
                    WizardState::PickTechnology { category }
                } else {
                    debug!(%category, "category has no technology, skipping step 7");
                    WizardState::EnterTime
                }
            }
            WizardState::PickTechnology { .. } => {
                let option = open_and_find_option(
                    page,
                    waiter,
                    &selectors.technology_trigger,
                    &selectors.technology_option,
                    &[self.settings.technology_label.as_str()],
                    timeout,
                )
                .await?;
                page.press(&option).await?;
                WizardState::EnterTime
            }
            WizardState::EnterTime => {
                self.sheet
                    .enter_time(
                        &selectors.wizard_hours_input,
                        &selectors.wizard_minutes_input,
                        &ctx.pending_task,
                    )
                    .await?;
                self.press(&selectors.wizard_incur_button, &[]).await?;
                WizardState::Done
            }
            WizardState::Done => WizardState::Done,
        };
        Ok(next)
    }

    async fn press(&self, selector: &str, required_text: &[&str]) -> Result<(), FlowError> {
        press_when_ready(
            self.sheet.page(),
            self.sheet.waiter(),
            selector,
            required_text,
            self.sheet.timeouts().wizard_step(),
        )
        .await?;
        Ok(())
    }
}
