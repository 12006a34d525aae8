use chrono::{Local, NaiveDate};
use serde::Serialize;

/// A weeding pass scheduled on a job site.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedWeeding {
    pub id: i64,
    pub job_site_id: i64,
    pub planned_date: NaiveDate,
    pub done: bool,
    pub notes: String,
    pub created_at: String,
}

impl PlannedWeeding {
    pub fn new(job_site_id: i64, planned_date: NaiveDate, notes: Option<&str>) -> Self {
        Self {
            id: 0,
            job_site_id,
            planned_date,
            done: false,
            notes: notes.unwrap_or_default().trim().to_string(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    /// Pending and already past its planned date.
    pub fn is_late(&self, today: NaiveDate) -> bool {
        !self.done && self.planned_date < today
    }
}
