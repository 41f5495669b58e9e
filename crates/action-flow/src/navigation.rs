//! Navigation controller: drives the timesheet to a requested date.
//!
//! The date picker only reacts to the page framework's own instance, which the
//! isolated automation context cannot reach. The controller therefore writes the
//! request onto `<body>` and runs [`DATE_BRIDGE_SCRIPT`] in the page context,
//! then confirms the effect by watching the date header.

use action_primitives::{read_text, settle};
use autoincur_core_types::{day_marker, long_spanish_date, month_title, page_date, parse_month_title};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument, warn};

use crate::errors::FlowError;
use crate::timesheet::Timesheet;

/// Versioned script run in the page context; a no-op when the attributes are absent.
pub const DATE_BRIDGE_SCRIPT: &str = include_str!("../assets/date_bridge.js");
pub const BRIDGE_FORM_ATTRIBUTE: &str = "data-autoincur-form";
pub const BRIDGE_DATE_ATTRIBUTE: &str = "data-autoincur-date";

const MAX_MONTH_STEPS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    ViewingMainPage,
    ViewingCalendar,
    AwaitingPageRefresh,
    Confirmed,
    Failed,
}

pub struct NavigationController<'a> {
    sheet: &'a Timesheet,
    state: NavState,
}

impl<'a> NavigationController<'a> {
    pub fn new(sheet: &'a Timesheet) -> Self {
        Self {
            sheet,
            state: NavState::Idle,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Brings the page to `date`. Never retries; a timeout leaves the
    /// controller in [`NavState::Failed`].
    #[instrument(skip_all, fields(date = %date))]
    pub async fn navigate_to(&mut self, date: NaiveDate) -> Result<(), FlowError> {
        self.state = NavState::Idle;
        match self.drive(date).await {
            Ok(()) => {
                self.state = NavState::Confirmed;
                Ok(())
            }
            Err(err) => {
                warn!(state = ?self.state, %err, "navigation failed");
                self.state = NavState::Failed;
                Err(FlowError::Navigation {
                    date: page_date(date),
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn drive(&mut self, date: NaiveDate) -> Result<(), FlowError> {
        let current = self.sheet.displayed_date().await?;
        self.state = NavState::ViewingMainPage;
        if shows_at_boundary(&current, &long_spanish_date(date)) {
            debug!(%current, "page already shows the requested date");
            return Ok(());
        }

        self.open_calendar().await?;

        let page = self.sheet.page();
        page.set_shared_attribute(BRIDGE_FORM_ATTRIBUTE, &self.sheet.selectors().date_form_id)
            .await?;
        page.set_shared_attribute(BRIDGE_DATE_ATTRIBUTE, &page_date(date))
            .await?;
        page.run_in_page_context(DATE_BRIDGE_SCRIPT).await?;
        self.state = NavState::AwaitingPageRefresh;

        self.wait_for_old_date_to_go(&current).await?;
        settle(self.sheet.timeouts().settle()).await;
        self.wait_for_day_marker(&day_marker(date)).await?;
        debug!("date change confirmed");
        Ok(())
    }

    async fn open_calendar(&mut self) -> Result<(), FlowError> {
        let selectors = self.sheet.selectors();
        self.sheet
            .press(&selectors.change_date_button, &[], self.sheet.timeouts().element())
            .await?;
        self.sheet
            .waiter()
            .element(
                self.sheet.page(),
                &selectors.calendar_marker,
                &[],
                None,
                self.sheet.timeouts().calendar(),
            )
            .await?;
        self.state = NavState::ViewingCalendar;
        Ok(())
    }

    async fn wait_for_old_date_to_go(&self, old: &str) -> Result<(), FlowError> {
        let page = self.sheet.page();
        let selector = self.sheet.selectors().date_display.as_str();
        self.sheet
            .waiter()
            .condition(
                || async move {
                    Ok(match read_text(page, selector).await? {
                        Some(text) => text != old,
                        None => true,
                    })
                },
                self.sheet.timeouts().page_refresh(),
                &format!("date display leaves '{old}'"),
            )
            .await?;
        Ok(())
    }

    async fn wait_for_day_marker(&self, marker: &str) -> Result<(), FlowError> {
        let page = self.sheet.page();
        let selector = self.sheet.selectors().date_display.as_str();
        self.sheet
            .waiter()
            .condition(
                || async move {
                    Ok(read_text(page, selector)
                        .await?
                        .map(|text| shows_at_boundary(&text, marker))
                        .unwrap_or(false))
                },
                self.sheet.timeouts().page_refresh(),
                &format!("date display shows '{marker}'"),
            )
            .await?;
        Ok(())
    }

    /// Days of `month` the calendar flags as having entries.
    ///
    /// Opens the calendar, pages it to `month`, reads the flagged cells and
    /// closes it again.
    #[instrument(skip_all, fields(month = %month_title(month)))]
    pub async fn flagged_days(&mut self, month: NaiveDate) -> Result<Vec<NaiveDate>, FlowError> {
        self.open_calendar().await?;
        self.show_month(month).await?;

        let cells = self
            .sheet
            .page()
            .query(&self.sheet.selectors().calendar_flagged_day, None)
            .await?;
        let mut days: Vec<NaiveDate> = cells
            .iter()
            .filter_map(|cell| cell.trimmed_text().parse::<u32>().ok())
            .filter_map(|day| NaiveDate::from_ymd_opt(month.year(), month.month(), day))
            .collect();
        days.sort();
        days.dedup();
        debug!(flagged = days.len(), "read calendar flags");

        self.close_calendar().await?;
        Ok(days)
    }

    async fn show_month(&self, month: NaiveDate) -> Result<(), FlowError> {
        let target = (month.year(), month.month());
        let selectors = self.sheet.selectors();
        for _ in 0..MAX_MONTH_STEPS {
            let title = self.calendar_title().await?;
            let shown = parse_month_title(&title).ok_or_else(|| {
                FlowError::Page(format!("unreadable calendar title '{title}'"))
            })?;
            if shown == target {
                return Ok(());
            }
            let button = if shown > target {
                &selectors.calendar_previous
            } else {
                &selectors.calendar_next
            };
            self.sheet
                .press(button, &[], self.sheet.timeouts().element())
                .await?;
            self.wait_for_title_change(&title).await?;
        }
        Err(FlowError::NotFound(format!(
            "calendar month {}",
            month_title(month)
        )))
    }

    async fn calendar_title(&self) -> Result<String, FlowError> {
        let title = self
            .sheet
            .waiter()
            .element(
                self.sheet.page(),
                &self.sheet.selectors().calendar_title,
                &[],
                None,
                self.sheet.timeouts().calendar(),
            )
            .await?;
        Ok(title.trimmed_text().to_string())
    }

    async fn wait_for_title_change(&self, old: &str) -> Result<(), FlowError> {
        let page = self.sheet.page();
        let selector = self.sheet.selectors().calendar_title.as_str();
        self.sheet
            .waiter()
            .condition(
                || async move {
                    Ok(read_text(page, selector)
                        .await?
                        .map(|text| text != old)
                        .unwrap_or(false))
                },
                self.sheet.timeouts().calendar(),
                "calendar month changes",
            )
            .await?;
        Ok(())
    }

    async fn close_calendar(&mut self) -> Result<(), FlowError> {
        let page = self.sheet.page();
        let close = page
            .query(&self.sheet.selectors().calendar_close_button, None)
            .await?;
        if let Some(button) = close.into_iter().find(|el| el.is_interactable()) {
            page.press(&button).await?;
        }
        self.state = NavState::ViewingMainPage;
        Ok(())
    }
}

/// Whether `needle` occurs in `text` without a digit right before it, so a
/// day such as "7 de" never matches inside "17 de".
fn shows_at_boundary(text: &str, needle: &str) -> bool {
    text.match_indices(needle).any(|(idx, _)| {
        !text[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit())
    })
}
