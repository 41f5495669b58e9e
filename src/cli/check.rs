use anyhow::Result;
use serde::Serialize;

use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Debug, Serialize)]
struct CheckReport {
    version: &'static str,
    config_file: String,
    config_found: bool,
    plan_file: String,
    browser: String,
    projects: usize,
    planned_days: usize,
    problem: Option<String>,
}

/// Loads both configuration files and reports whether a run could start.
pub async fn cmd_check(ctx: &CliContext) -> Result<bool> {
    let source = ctx.timesheet_source();
    let timesheet = source.read().await?;
    let app = ctx.config();

    let browser = match &app.browser.websocket_url {
        Some(url) => format!("connect to {url}"),
        None => match app.browser.resolve_executable() {
            Some(path) => format!("launch {} (headless: {})", path.display(), app.browser.headless),
            None => "launch (no Chromium executable found)".to_string(),
        },
    };

    let report = CheckReport {
        version: env!("CARGO_PKG_VERSION"),
        config_file: ctx.config_path().display().to_string(),
        config_found: ctx.config_path().exists(),
        plan_file: source.path().display().to_string(),
        browser,
        projects: timesheet.projects.len(),
        planned_days: timesheet.day_plan.len(),
        problem: timesheet.validate().err().map(|problem| problem.to_string()),
    };

    match ctx.output() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Human => {
            println!(
                "autoincur {} ({}, built {})",
                report.version,
                env!("GIT_HASH"),
                env!("BUILD_DATE")
            );
            println!(
                "- Config file: {}{}",
                report.config_file,
                if report.config_found { "" } else { " (not found, defaults)" }
            );
            println!("- Timesheet file: {}", report.plan_file);
            println!("- Browser: {}", report.browser);
            println!("- Projects: {}", report.projects);
            println!("- Planned days: {}", report.planned_days);
            match &report.problem {
                None => println!("Configuration OK"),
                Some(problem) => println!("Configuration invalid: {problem}"),
            }
        }
    }
    Ok(report.problem.is_none())
}
