use std::sync::Arc;
use std::time::Duration;

use action_primitives::{
    fill_when_ready, press_when_ready, read_text, ActionError, ElementHandle, PagePort, Waiter,
};
use autoincur_core_types::{last_clock_in, PlannedTask};
use tracing::debug;

use crate::errors::FlowError;
use crate::policy::FlowTimeouts;
use crate::selectors::PageSelectors;

/// The timesheet page plus the selectors and timeouts used to drive it.
#[derive(Clone)]
pub struct Timesheet {
    page: Arc<dyn PagePort>,
    selectors: Arc<PageSelectors>,
    timeouts: FlowTimeouts,
    waiter: Waiter,
}

impl Timesheet {
    pub fn new(page: Arc<dyn PagePort>, selectors: PageSelectors, timeouts: FlowTimeouts) -> Self {
        let waiter = Waiter::new(timeouts.poll_interval());
        Self {
            page,
            selectors: Arc::new(selectors),
            timeouts,
            waiter,
        }
    }

    pub fn page(&self) -> &dyn PagePort {
        self.page.as_ref()
    }

    pub fn selectors(&self) -> &PageSelectors {
        &self.selectors
    }

    pub fn timeouts(&self) -> &FlowTimeouts {
        &self.timeouts
    }

    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    pub async fn press(
        &self,
        selector: &str,
        required_text: &[&str],
        timeout: Duration,
    ) -> Result<ElementHandle, FlowError> {
        Ok(press_when_ready(self.page(), &self.waiter, selector, required_text, timeout).await?)
    }

    pub async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> Result<(), FlowError> {
        fill_when_ready(self.page(), &self.waiter, selector, value, timeout).await?;
        Ok(())
    }

    /// Current text of the date header, waiting for it to render.
    pub async fn displayed_date(&self) -> Result<String, FlowError> {
        let display = self
            .waiter
            .element(
                self.page(),
                &self.selectors.date_display,
                &[],
                None,
                self.timeouts.element(),
            )
            .await?;
        Ok(display.trimmed_text().to_string())
    }

    /// Minutes incurred on the displayed date, read from the total counter.
    pub async fn incurred_minutes(&self) -> Result<u32, FlowError> {
        let total = self
            .waiter
            .element(
                self.page(),
                &self.selectors.incurred_total,
                &[],
                None,
                self.timeouts.element(),
            )
            .await?;
        Ok(last_clock_in(&total.text).unwrap_or(0))
    }

    /// Waits until the incurred total differs from `before`.
    pub async fn wait_incurred_change(&self, before: u32) -> Result<u32, FlowError> {
        let selector = self.selectors.incurred_total.as_str();
        let page = self.page();
        let after = self
            .waiter
            .value(
                || async move {
                    let text = read_text(page, selector).await?;
                    Ok(text
                        .map(|text| last_clock_in(&text).unwrap_or(0))
                        .filter(|minutes| *minutes != before))
                },
                self.timeouts.incurred_change(),
                "incurred total changes",
            )
            .await?;
        debug!(before, after, "incurred total changed");
        Ok(after)
    }

    /// Opens the task selector and looks for the option of `task`.
    ///
    /// `None` means the option did not show up within the lookup timeout.
    pub async fn find_task_option(
        &self,
        task: &PlannedTask,
    ) -> Result<Option<ElementHandle>, FlowError> {
        self.press(
            &self.selectors.task_selector_trigger,
            &[],
            self.timeouts.element(),
        )
        .await?;
        match self
            .waiter
            .element(
                self.page(),
                &self.selectors.task_option,
                &task.option_markers(),
                None,
                self.timeouts.option_lookup(),
            )
            .await
        {
            Ok(option) => Ok(Some(option)),
            Err(ActionError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Folds the task selector when its option list is still showing.
    pub async fn close_task_selector(&self) -> Result<(), FlowError> {
        let options = self.page().query(&self.selectors.task_option, None).await?;
        if options.iter().any(ElementHandle::is_interactable) {
            debug!("closing task selector");
            self.press(
                &self.selectors.task_selector_trigger,
                &[],
                self.timeouts.element(),
            )
            .await?;
        }
        Ok(())
    }

    /// Presses a selector option and waits for the selection label to show it.
    pub async fn select_option(
        &self,
        option: &ElementHandle,
        markers: &[&str],
    ) -> Result<(), FlowError> {
        self.page.press(option).await?;
        let selector = self.selectors.task_selected_label.as_str();
        let page = self.page();
        self.waiter
            .condition(
                || async move {
                    Ok(read_text(page, selector)
                        .await?
                        .map(|label| markers.iter().all(|marker| label.contains(marker)))
                        .unwrap_or(false))
                },
                self.timeouts.element(),
                "task selection is shown",
            )
            .await?;
        Ok(())
    }

    /// Types hours and minutes into the given inputs and lets the page process them.
    pub async fn enter_time(
        &self,
        hours_selector: &str,
        minutes_selector: &str,
        task: &PlannedTask,
    ) -> Result<(), FlowError> {
        let timeout = self.timeouts.element();
        self.fill(hours_selector, &task.hours_text(), timeout).await?;
        self.fill(minutes_selector, &task.minutes_text(), timeout)
            .await?;
        action_primitives::settle(self.timeouts.field_settle()).await;
        Ok(())
    }
}
