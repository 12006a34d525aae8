//! Time utilities: parsing HH:MM, anchoring times on a date, formatting durations.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn parse_optional_time(input: Option<&str>) -> AppResult<Option<NaiveTime>> {
    match input {
        Some(s) => {
            let t = parse_time(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))?;
            Ok(Some(t))
        }
        None => Ok(None),
    }
}

/// Anchor a wall-clock time on `date` in the local timezone.
pub fn local_datetime(date: NaiveDate, time: NaiveTime) -> AppResult<DateTime<Local>> {
    date.and_time(time)
        .and_local_timezone(Local)
        .single()
        .ok_or_else(|| {
            AppError::InvalidTime(format!(
                "{} {} is ambiguous or skipped in the local timezone",
                date.format("%Y-%m-%d"),
                time.format("%H:%M")
            ))
        })
}

/// `HH:MM:SS`; negative spans render as zero, hours are not capped at 24.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(chrono::Duration::seconds(0)), "00:00:00");
        assert_eq!(format_elapsed(chrono::Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_elapsed(chrono::Duration::hours(26)), "26:00:00");
        assert_eq!(format_elapsed(chrono::Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn optional_time_rejects_garbage() {
        assert!(parse_optional_time(Some("25:99")).is_err());
        assert_eq!(parse_optional_time(None).unwrap(), None);
        assert_eq!(
            parse_optional_time(Some("08:30")).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
    }
}
