use std::sync::Arc;

use action_flow::{Orchestrator, Timesheet};
use action_primitives::PagePort;
use anyhow::{bail, Context, Result};
use cdp_adapter::BrowserSession;
use chrono::NaiveDate;
use tracing::info;

use crate::notifier::ConsoleNotifier;

use super::context::CliContext;
use super::output::print_outcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunAction {
    Today,
    Incur(NaiveDate, NaiveDate),
    Delete(NaiveDate, NaiveDate),
}

/// Drives one orchestrator run against the live timesheet tab.
pub async fn cmd_run(action: RunAction, ctx: &CliContext) -> Result<bool> {
    if let RunAction::Incur(start, end) | RunAction::Delete(start, end) = action {
        if start > end {
            bail!("start date {start} is after end date {end}");
        }
    }

    let config = ctx.config();
    let source = ctx.timesheet_source();
    source.read().await?;

    let session = BrowserSession::start(&config.browser)
        .await
        .context("Failed to open the timesheet tab")?;
    let page: Arc<dyn PagePort> = session.page();
    let sheet = Timesheet::new(page, config.selectors.clone(), config.timeouts.clone());
    let orchestrator = Orchestrator::new(
        sheet,
        Arc::new(source),
        Arc::new(ConsoleNotifier::new(ctx.output())),
    )
    .with_wizard(config.wizard.clone());

    info!(?action, "starting run");
    let outcome = match action {
        RunAction::Today => orchestrator.incur_today().await,
        RunAction::Incur(start, end) => orchestrator.incur_range(start, end).await,
        RunAction::Delete(start, end) => orchestrator.delete_range(start, end).await,
    };
    session.close().await;

    print_outcome(&outcome, ctx.output())?;
    Ok(outcome.ok)
}
