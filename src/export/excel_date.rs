// src/export/excel_date.rs

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Recognise `YYYY-MM-DD` dates and `HH:MM` times in export cells and turn
/// them into an Excel serial plus its number format.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(("yyyy-mm-dd", date_to_excel_serial(d)));
    }

    if s.len() == 5
        && let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M")
    {
        let seconds = t.num_seconds_from_midnight() as f64;
        return Some(("hh:mm", seconds / 86400.0));
    }

    None
}

/// Days since the Excel epoch (1899-12-30).
fn date_to_excel_serial(d: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (d - epoch).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_times_become_serials() {
        assert_eq!(parse_to_excel_date("2024-01-01"), Some(("yyyy-mm-dd", 45292.0)));
        assert_eq!(parse_to_excel_date("12:00"), Some(("hh:mm", 0.5)));
        assert_eq!(parse_to_excel_date("Dupont"), None);
        assert_eq!(parse_to_excel_date("120"), None);
    }
}
