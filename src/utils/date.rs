use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today when absent.
pub fn parse_date_or_today(input: Option<&str>) -> AppResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(today()),
    }
}

/// Human hint for a day count relative to today: "today", "in 3 d", "5 d ago".
pub fn relative_days(date: NaiveDate, today: NaiveDate) -> String {
    let d = (date - today).num_days();
    match d {
        0 => "today".to_string(),
        d if d > 0 => format!("in {} d", d),
        d => format!("{} d ago", -d),
    }
}
