//! Entry points for one automation run.
//!
//! A run holds the page exclusively: a request arriving while another run is
//! in progress is refused, not queued. Configuration is reloaded at the start
//! of every run. Range runs isolate failures per day.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autoincur_core_types::{days_between, format_clock, page_date, Configuration};
use chrono::NaiveDate;
use day_planner::day_plan;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::deletion::DeletionFlow;
use crate::errors::FlowError;
use crate::incurring::{DayReport, IncurringLoop};
use crate::navigation::NavigationController;
use crate::notify::{Notifier, Severity};
use crate::timesheet::Timesheet;
use crate::wizard::{TaskWizard, WizardSettings};

const SUMMARY_DURATION: Duration = Duration::from_secs(8);
const DAY_DURATION: Duration = Duration::from_secs(5);

/// Supplies the timesheet configuration at the start of each run.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn load(&self) -> Result<Configuration, FlowError>;
}

/// A configuration fixed at construction time.
pub struct StaticConfiguration(pub Configuration);

#[async_trait]
impl ConfigurationSource for StaticConfiguration {
    async fn load(&self) -> Result<Configuration, FlowError> {
        Ok(self.0.clone())
    }
}

/// Result of one action request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    pub message: String,
}

enum RunSummary {
    Completed(String),
    /// Finished, but some days or tasks failed.
    Partial(String),
}

pub struct Orchestrator {
    sheet: Timesheet,
    wizard: WizardSettings,
    source: Arc<dyn ConfigurationSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    ready: OnceCell<()>,
    run_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        sheet: Timesheet,
        source: Arc<dyn ConfigurationSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sheet,
            wizard: WizardSettings::default(),
            source,
            notifier,
            clock: Arc::new(SystemClock),
            ready: OnceCell::new(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_wizard(mut self, wizard: WizardSettings) -> Self {
        self.wizard = wizard;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[instrument(skip_all)]
    pub async fn incur_today(&self) -> ActionOutcome {
        let today = self.clock.today();
        let result = self.try_incur_today(today).await;
        self.finish(result)
    }

    #[instrument(skip_all, fields(start = %start, end = %end))]
    pub async fn incur_range(&self, start: NaiveDate, end: NaiveDate) -> ActionOutcome {
        let result = self.try_incur_range(start, end).await;
        self.finish(result)
    }

    #[instrument(skip_all, fields(start = %start, end = %end))]
    pub async fn delete_range(&self, start: NaiveDate, end: NaiveDate) -> ActionOutcome {
        let result = self.try_delete_range(start, end).await;
        self.finish(result)
    }

    async fn try_incur_today(&self, today: NaiveDate) -> Result<RunSummary, FlowError> {
        let (_run, config) = self.begin().await?;
        let summary = match self.incur_day(&config, today).await? {
            None => RunSummary::Completed(format!("Nothing planned for {}", page_date(today))),
            Some(report) => day_summary(&report),
        };
        Ok(summary)
    }

    async fn try_incur_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunSummary, FlowError> {
        check_range(start, end)?;
        let (_run, config) = self.begin().await?;

        let (mut incurred, mut skipped, mut failed, mut partial) = (0, 0, 0, 0);
        for date in days_between(start, end) {
            match self.incur_day(&config, date).await {
                Ok(None) => skipped += 1,
                Ok(Some(report)) => {
                    incurred += 1;
                    let (message, severity) = match day_summary(&report) {
                        RunSummary::Completed(message) => (message, Severity::Info),
                        RunSummary::Partial(message) => {
                            partial += 1;
                            (message, Severity::Warning)
                        }
                    };
                    self.notifier.notify(&message, severity, Some(DAY_DURATION));
                }
                Err(err) => {
                    warn!(%date, %err, "day failed");
                    self.notifier.notify(
                        &format!("{}: {}", page_date(date), err),
                        Severity::Error,
                        Some(SUMMARY_DURATION),
                    );
                    failed += 1;
                }
            }
        }

        let message = format!(
            "{} to {}: {incurred} day(s) incurred, {failed} failed, {partial} incomplete, {skipped} not working",
            page_date(start),
            page_date(end)
        );
        Ok(if failed + partial > 0 {
            RunSummary::Partial(message)
        } else {
            RunSummary::Completed(message)
        })
    }

    async fn try_delete_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunSummary, FlowError> {
        check_range(start, end)?;
        let (_run, _config) = self.begin().await?;
        let report = DeletionFlow::new(&self.sheet, self.notifier.as_ref())
            .run(start, end, self.clock.today())
            .await?;

        let message = format!(
            "{} to {}: {} entries deleted on {} day(s), {} locked, {} failed",
            page_date(start),
            page_date(end),
            report.deleted_entries,
            report.cleared_days.len(),
            report.locked_days.len(),
            report.failed_days.len()
        );
        Ok(if report.failed_days.is_empty() {
            RunSummary::Completed(message)
        } else {
            RunSummary::Partial(message)
        })
    }

    /// Takes the run lock, checks the page once, and loads a valid configuration.
    async fn begin(&self) -> Result<(MutexGuard<'_, ()>, Configuration), FlowError> {
        let guard = self.run_lock.try_lock().map_err(|_| FlowError::Busy)?;
        self.ready
            .get_or_try_init(|| async {
                let shown = self.sheet.displayed_date().await?;
                info!(%shown, "timesheet page ready");
                Ok::<(), FlowError>(())
            })
            .await?;

        let config = self.source.load().await?;
        config
            .validate()
            .map_err(|problem| FlowError::ConfigurationInvalid(problem.to_string()))?;
        Ok((guard, config))
    }

    /// `None` when `date` is not a working day.
    async fn incur_day(
        &self,
        config: &Configuration,
        date: NaiveDate,
    ) -> Result<Option<DayReport>, FlowError> {
        let plan = day_plan(date, config);
        if !plan.is_working_day() {
            info!(%date, "not a working day");
            return Ok(None);
        }

        NavigationController::new(&self.sheet)
            .navigate_to(date)
            .await?;
        let wizard = TaskWizard::new(&self.sheet, &self.wizard, &config.sda_common_code);
        let report = IncurringLoop::new(&self.sheet, wizard, self.notifier.as_ref())
            .run(date, &plan.tasks)
            .await?;
        Ok(Some(report))
    }

    fn finish(&self, result: Result<RunSummary, FlowError>) -> ActionOutcome {
        let (ok, message, severity) = match result {
            Ok(RunSummary::Completed(message)) => (true, message, Severity::Success),
            Ok(RunSummary::Partial(message)) => (false, message, Severity::Warning),
            Err(err) => (false, err.to_string(), Severity::Error),
        };
        self.notifier
            .notify(&message, severity, Some(SUMMARY_DURATION));
        ActionOutcome { ok, message }
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), FlowError> {
    if start > end {
        return Err(FlowError::InvalidRequest(format!(
            "start {} is after end {}",
            page_date(start),
            page_date(end)
        )));
    }
    Ok(())
}

fn day_summary(report: &DayReport) -> RunSummary {
    let mut message = format!(
        "{}: {} of {} incurred",
        page_date(report.date),
        format_clock(report.final_minutes),
        format_clock(report.planned_minutes)
    );
    if report.failed_tasks() > 0 {
        message.push_str(&format!(", {} task(s) failed", report.failed_tasks()));
    }
    if report.failed_tasks() > 0 || !report.within_tolerance() {
        RunSummary::Partial(message)
    } else {
        RunSummary::Completed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::notify::RecordingNotifier;
    use crate::testing::{sheet_for, SheetFixture};
    use autoincur_core_types::{date_key, DayPlanEntry, Project};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn config(days: &[u32]) -> Configuration {
        let mut config = Configuration {
            projects: vec![Project::new("PRJ-1", "Billing")],
            sda_common_code: "SDA-COMMON".into(),
            ..Configuration::default()
        };
        for d in days {
            config.daily_expected_hours.insert(date_key(day(*d)), "2".into());
            config
                .day_plan
                .insert(date_key(day(*d)), vec![DayPlanEntry::new(0, "Construcción", "")]);
        }
        config
    }

    fn orchestrator(
        fixture: &SheetFixture,
        source: Arc<dyn ConfigurationSource>,
        notifier: Arc<RecordingNotifier>,
    ) -> Orchestrator {
        Orchestrator::new(sheet_for(fixture), source, notifier)
            .with_clock(Arc::new(FixedClock(day(17))))
    }

    #[tokio::test]
    async fn incur_today_reports_one_success() {
        let fixture = SheetFixture::new("00:00");
        fixture.add_option("[Construcción] PRJ-1 Billing 00:00");
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[17]))),
            notifier.clone(),
        );

        let outcome = orch.incur_today().await;
        assert!(outcome.ok, "{}", outcome.message);
        assert_eq!(outcome.message, "17/03/2025: 02:00 of 02:00 incurred");
        assert_eq!(notifier.count(Severity::Success), 1);
        assert_eq!(notifier.count(Severity::Error), 0);
    }

    #[tokio::test]
    async fn incomplete_day_reports_one_warning() {
        // The option is missing and the wizard finds no project, so nothing is incurred.
        let fixture = SheetFixture::new("00:00");
        fixture.install_wizard(false);
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[17]))),
            notifier.clone(),
        );

        let outcome = orch.incur_today().await;
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            "17/03/2025: 00:00 of 02:00 incurred, 1 task(s) failed"
        );
        assert_eq!(notifier.count(Severity::Warning), 1);
        assert_eq!(notifier.count(Severity::Error), 1);
        assert_eq!(notifier.count(Severity::Success), 0);
        assert_eq!(notifier.entries().len(), 2);
    }

    #[tokio::test]
    async fn invalid_configuration_aborts_with_one_error() {
        let fixture = SheetFixture::new("00:00");
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(Configuration::default())),
            notifier.clone(),
        );

        let outcome = orch.incur_today().await;
        assert!(!outcome.ok);
        assert!(outcome.message.contains("no projects"));
        assert_eq!(notifier.entries().len(), 1);
        assert_eq!(notifier.count(Severity::Error), 1);
        assert!(fixture.page.mutations().is_empty());
    }

    #[tokio::test]
    async fn range_isolates_failing_days() {
        // Day 18 cannot be reached: the page has no date picker.
        let fixture = SheetFixture::new("00:00");
        fixture.add_option("[Construcción] PRJ-1 Billing 00:00");
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[17, 18]))),
            notifier.clone(),
        );

        let outcome = orch.incur_range(day(16), day(18)).await;
        assert!(!outcome.ok);
        assert!(
            outcome.message.contains("1 day(s) incurred, 1 failed"),
            "{}",
            outcome.message
        );
        assert_eq!(notifier.count(Severity::Error), 1);
        assert_eq!(notifier.count(Severity::Warning), 1);
        assert_eq!(notifier.count(Severity::Success), 0);
        assert_eq!(fixture.total().as_deref(), Some("Total: 02:00"));
    }

    #[tokio::test]
    async fn range_moves_between_working_days() {
        let fixture = SheetFixture::new("00:00");
        fixture.add_option("[Construcción] PRJ-1 Billing 00:00");
        fixture.install_calendar("marzo 2025", &[]);
        fixture.install_bridge();
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[17, 18]))),
            notifier.clone(),
        );

        let outcome = orch.incur_range(day(17), day(18)).await;
        assert!(outcome.ok, "{}", outcome.message);
        assert!(
            outcome.message.contains("2 day(s) incurred, 0 failed"),
            "{}",
            outcome.message
        );
        let days: Vec<String> = notifier
            .entries()
            .into_iter()
            .filter(|entry| entry.severity == Severity::Info)
            .map(|entry| entry.message)
            .collect();
        assert_eq!(
            days,
            vec![
                "17/03/2025: 02:00 of 02:00 incurred".to_string(),
                "18/03/2025: 02:00 of 02:00 incurred".to_string(),
            ]
        );
        assert_eq!(notifier.count(Severity::Success), 1);
        assert_eq!(notifier.count(Severity::Warning), 0);
        assert_eq!(notifier.count(Severity::Error), 0);
        assert_eq!(
            fixture
                .page
                .with_dom(|dom| dom.text_of(&fixture.selectors.date_display))
                .as_deref(),
            Some("18 de marzo de 2025")
        );
        assert_eq!(fixture.total().as_deref(), Some("Total: 02:00"));
    }

    #[tokio::test]
    async fn delete_range_clears_flagged_days() {
        let fixture = SheetFixture::new("03:00");
        fixture.show_date("20 de marzo de 2025");
        fixture.install_calendar("marzo 2025", &[20]);
        fixture.add_option("[Diseño] PRJ-1 01:00");
        fixture.add_option("[Construcción] PRJ-2 02:00");
        fixture.install_delete();
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[]))),
            notifier.clone(),
        );

        let outcome = orch.delete_range(day(1), day(31)).await;
        assert!(outcome.ok, "{}", outcome.message);
        assert!(
            outcome
                .message
                .contains("2 entries deleted on 1 day(s), 0 locked, 0 failed"),
            "{}",
            outcome.message
        );
        assert_eq!(notifier.count(Severity::Success), 1);
        assert_eq!(notifier.count(Severity::Error), 0);
        assert_eq!(fixture.option_count(), 0);
        assert_eq!(fixture.total().as_deref(), Some("Total: 00:00"));
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let fixture = SheetFixture::new("00:00");
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(
            &fixture,
            Arc::new(StaticConfiguration(config(&[]))),
            notifier.clone(),
        );
        let outcome = orch.delete_range(day(20), day(10)).await;
        assert!(!outcome.ok);
        assert!(outcome.message.starts_with("Invalid request"));
    }

    struct SlowSource(Configuration);

    #[async_trait]
    impl ConfigurationSource for SlowSource {
        async fn load(&self) -> Result<Configuration, FlowError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn concurrent_request_is_refused() {
        let fixture = SheetFixture::new("00:00");
        fixture.add_option("[Construcción] PRJ-1 Billing 00:00");
        let notifier = Arc::new(RecordingNotifier::new());
        let orch = orchestrator(&fixture, Arc::new(SlowSource(config(&[17]))), notifier.clone());

        let (first, second) = tokio::join!(orch.incur_today(), orch.incur_today());
        assert!(first.ok, "{}", first.message);
        assert!(!second.ok);
        assert_eq!(second.message, FlowError::Busy.to_string());
    }
}
