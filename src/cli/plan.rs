use anyhow::{bail, Result};
use autoincur_core_types::{format_clock, page_date, PlannedTask};
use chrono::{Days, Local, NaiveDate};
use day_planner::day_plan;
use serde::Serialize;
use tracing::warn;

use super::commands::PlanArgs;
use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Debug, Serialize)]
struct PlannedDay {
    date: NaiveDate,
    expected_hours: Option<String>,
    working: bool,
    total_minutes: u32,
    tasks: Vec<PlannedTask>,
}

/// Dry run of the allocator; never opens the browser.
pub async fn cmd_plan(args: PlanArgs, ctx: &CliContext) -> Result<bool> {
    if args.days == 0 {
        bail!("--days must be at least 1");
    }
    let config = ctx.timesheet_source().read().await?;
    if let Err(problem) = config.validate() {
        warn!(%problem, "timesheet configuration would be rejected by a run");
    }

    let start = args.date.unwrap_or_else(|| Local::now().date_naive());
    let days: Vec<PlannedDay> = (0..args.days)
        .filter_map(|offset| start.checked_add_days(Days::new(u64::from(offset))))
        .map(|date| {
            let plan = day_plan(date, &config);
            PlannedDay {
                date,
                expected_hours: config.expected_hours(date).map(str::to_string),
                working: plan.is_working_day(),
                total_minutes: plan.total_minutes(),
                tasks: plan.tasks,
            }
        })
        .collect();

    match ctx.output() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&days)?),
        OutputFormat::Human => {
            for day in &days {
                if !day.working {
                    println!("{}  not a working day", page_date(day.date));
                    continue;
                }
                println!(
                    "{}  {} planned",
                    page_date(day.date),
                    format_clock(day.total_minutes)
                );
                for task in &day.tasks {
                    println!(
                        "    {:<16} {:<12} {}",
                        task.name,
                        task.project_code,
                        format_clock(task.total_minutes())
                    );
                }
            }
        }
    }
    Ok(true)
}
