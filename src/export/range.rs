// src/export/range.rs

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// Parse `--range` / `--period` into inclusive date bounds.
///
/// Accepted forms: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two of the same form
/// joined by `:` (`2024-03:2024-06`).
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();

    let Some((start_raw, end_raw)) = r.split_once(':') else {
        return period_bounds(r);
    };

    let (start, end) = (start_raw.trim(), end_raw.trim());
    if start.len() != end.len() {
        return Err(AppError::InvalidDate(format!(
            "{r}: start and end must have the same format"
        )));
    }

    let (from, _) = period_bounds(start)?;
    let (_, to) = period_bounds(end)?;

    if to < from {
        return Err(AppError::InvalidDate(format!("{r}: end is before start")));
    }
    Ok((from, to))
}

fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(format!("unsupported range '{p}' (use YYYY, YYYY-MM or YYYY-MM-DD)"));

    match p.len() {
        4 => {
            let y: i32 = p.parse().map_err(|_| bad())?;
            let from = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let to = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((from, to))
        }
        7 => {
            let from = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d").map_err(|_| bad())?;
            Ok((from, last_day_of_month(from).ok_or_else(bad)?))
        }
        10 => {
            let d = NaiveDate::parse_from_str(p, "%Y-%m-%d").map_err(|_| bad())?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}

fn last_day_of_month(d: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}
