use autoincur_core_types::parse_date_arg;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Incur today's planned tasks
    Today,

    /// Incur every working day of a date range
    Range(RangeArgs),

    /// Delete incurred entries over a date range
    Delete(RangeArgs),

    /// Show the planned allocation without opening the browser
    Plan(PlanArgs),

    /// Validate the configuration files and show the resolved settings
    Check,
}

#[derive(Args, Clone, Debug)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last day, inclusive
    #[arg(value_parser = parse_date)]
    pub end: NaiveDate,
}

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    /// First day to plan (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Number of consecutive days
    #[arg(long, default_value_t = 1)]
    pub days: u32,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date_arg(raw).map_err(|err| err.to_string())
}
