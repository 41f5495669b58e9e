use chrono::{Datelike, NaiveDate};

use crate::TypesError;

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Key used by the configuration maps (`2025-03-17`).
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Value written into the timesheet's date field (`17/03/2025`).
pub fn page_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Date as the timesheet header renders it (`17 de marzo de 2025`).
pub fn long_spanish_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        SPANISH_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Day-of-month fragment used to confirm a date change (`17 de`).
pub fn day_marker(date: NaiveDate) -> String {
    format!("{} de", date.day())
}

/// Calendar header for the month containing `date` (`marzo 2025`).
pub fn month_title(date: NaiveDate) -> String {
    format!("{} {}", SPANISH_MONTHS[date.month0() as usize], date.year())
}

/// Year and month of a calendar header such as `Marzo 2025`.
pub fn parse_month_title(text: &str) -> Option<(i32, u32)> {
    let lowered = text.to_lowercase();
    let mut words = lowered.split_whitespace();
    let month_word = words.next()?;
    let year = words.next()?.parse::<i32>().ok()?;
    let month = SPANISH_MONTHS
        .iter()
        .position(|name| *name == month_word)?;
    Some((year, month as u32 + 1))
}

/// Accepts both the ISO form and the day-first form used by the page.
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate, TypesError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| TypesError::InvalidDate(raw.to_string()))
}

/// Inclusive iterator over the days between two dates.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
