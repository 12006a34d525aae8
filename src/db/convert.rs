//! Column conversions shared by the row mappers.

use crate::errors::AppError;
use chrono::{DateTime, Local, NaiveDate};
use rusqlite::types::Type;

pub const DATE_FMT: &str = "%Y-%m-%d";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub fn date_to_sql(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub fn parse_date_col(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT)
        .map_err(|_| conversion_error(idx, AppError::InvalidDate(raw.to_string())))
}

pub fn ts_to_sql(ts: &Option<DateTime<Local>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

pub fn parse_ts_col(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Local>>> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Local)))
            .map_err(|_| conversion_error(idx, AppError::InvalidTime(s))),
    }
}

/// Map an enum column through its `from_db_str`, failing the row on unknown values.
pub fn parse_enum_col<T>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    err: impl Fn(String) -> AppError,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| conversion_error(idx, err(raw.to_string())))
}
