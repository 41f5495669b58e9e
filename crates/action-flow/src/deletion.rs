//! Deletion flow: clears incurred entries over a date range.

use std::time::Duration;

use action_primitives::{ActionError, ElementHandle};
use autoincur_core_types::{last_clock_in, page_date};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::FlowError;
use crate::navigation::NavigationController;
use crate::notify::{Notifier, Severity};
use crate::timesheet::Timesheet;

/// Upper bound of delete submissions for one day.
pub const MAX_DELETE_ATTEMPTS: u32 = 15;

const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Whether the fortnightly lock forbids editing `day` when today is `today`.
///
/// The first half of a month (1..=15) locks once today is past the 16th of that
/// month; the second half locks once the month has rolled over.
pub fn fortnight_locked(day: NaiveDate, today: NaiveDate) -> bool {
    let month_of_day = (day.year(), day.month());
    let current_month = (today.year(), today.month());
    if current_month > month_of_day {
        return true;
    }
    if current_month < month_of_day {
        return false;
    }
    day.day() <= 15 && today.day() > 16
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub cleared_days: Vec<NaiveDate>,
    pub deleted_entries: u32,
    pub locked_days: Vec<NaiveDate>,
    pub failed_days: Vec<NaiveDate>,
}

pub struct DeletionFlow<'a> {
    sheet: &'a Timesheet,
    notifier: &'a dyn Notifier,
}

impl<'a> DeletionFlow<'a> {
    pub fn new(sheet: &'a Timesheet, notifier: &'a dyn Notifier) -> Self {
        Self { sheet, notifier }
    }

    /// Deletes every deletable entry on the flagged, unlocked days of the range.
    #[instrument(skip_all, fields(start = %start, end = %end))]
    pub async fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<DeletionReport, FlowError> {
        let mut report = DeletionReport::default();
        let mut navigator = NavigationController::new(self.sheet);

        for month in months_between(start, end) {
            let flagged = match navigator.flagged_days(month).await {
                Ok(days) => days,
                Err(err) => {
                    warn!(%err, "could not read calendar flags");
                    self.notifier.notify(
                        &format!("{}: {}", month.format("%m/%Y"), err),
                        Severity::Error,
                        Some(NOTICE_DURATION),
                    );
                    continue;
                }
            };

            for day in flagged.into_iter().filter(|d| *d >= start && *d <= end) {
                if fortnight_locked(day, today) {
                    info!(%day, "day is locked, skipping");
                    self.notifier.notify(
                        &format!("{}: locked, not deleted", page_date(day)),
                        Severity::Info,
                        None,
                    );
                    report.locked_days.push(day);
                    continue;
                }

                let cleared = match navigator.navigate_to(day).await {
                    Ok(()) => self.clear_day().await,
                    Err(err) => Err(err),
                };
                match cleared {
                    Ok(deleted) => {
                        report.deleted_entries += deleted;
                        report.cleared_days.push(day);
                    }
                    Err(err) => {
                        warn!(%day, %err, "deletion failed");
                        self.notifier.notify(
                            &format!("{}: {}", page_date(day), err),
                            Severity::Error,
                            Some(NOTICE_DURATION),
                        );
                        report.failed_days.push(day);
                    }
                }
            }
        }
        Ok(report)
    }

    /// Deletes entries of the displayed day until none is left or the attempt
    /// ceiling is reached. Returns how many were deleted.
    async fn clear_day(&self) -> Result<u32, FlowError> {
        let selectors = self.sheet.selectors();
        let mut deleted = 0;
        for attempt in 1..=MAX_DELETE_ATTEMPTS {
            let Some(option) = self.first_deletable().await? else {
                debug!(deleted, "no deletable entries left");
                return Ok(deleted);
            };
            debug!(attempt, option = %option.trimmed_text(), "deleting entry");
            let before = self.sheet.incurred_minutes().await?;
            self.sheet.select_option(&option, &[option.trimmed_text()]).await?;
            self.sheet
                .press(&selectors.delete_button, &[], self.sheet.timeouts().element())
                .await?;
            self.sheet.wait_incurred_change(before).await?;
            deleted += 1;
        }
        warn!(deleted, "attempt ceiling reached");
        Ok(deleted)
    }

    async fn first_deletable(&self) -> Result<Option<ElementHandle>, FlowError> {
        let selectors = self.sheet.selectors();
        self.sheet
            .press(&selectors.task_selector_trigger, &[], self.sheet.timeouts().element())
            .await?;
        let page = self.sheet.page();
        let option_selector = selectors.task_option.as_str();
        let options = match self
            .sheet
            .waiter()
            .value(
                || async move {
                    let found = page.query(option_selector, None).await?;
                    Ok((!found.is_empty()).then_some(found))
                },
                self.sheet.timeouts().option_lookup(),
                "task options are listed",
            )
            .await
        {
            Ok(options) => options,
            Err(ActionError::ConditionTimeout(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(options.into_iter().find(|option| {
            !selectors.is_placeholder(&option.text)
                && last_clock_in(&option.text).is_some_and(|minutes| minutes > 0)
        }))
    }
}

/// First day of every month touched by the range.
fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut cursor = start.with_day(1);
    while let Some(month) = cursor {
        if month > end {
            break;
        }
        months.push(month);
        cursor = month.checked_add_months(Months::new(1));
    }
    months
}
