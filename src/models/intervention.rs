use super::intervention_type::InterventionType;
use chrono::{DateTime, Local, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InterventionStatus {
    InProgress,
    Completed,
}

impl InterventionStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            InterventionStatus::InProgress => "in_progress",
            InterventionStatus::Completed => "completed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(InterventionStatus::InProgress),
            "completed" => Some(InterventionStatus::Completed),
            _ => None,
        }
    }
}

/// A single service visit on a job site.
#[derive(Debug, Clone, Serialize)]
pub struct Intervention {
    pub id: i64,
    pub job_site_id: i64,                  // ⇔ interventions.job_site_id (FK, cascade)
    pub kind: InterventionType,            // ⇔ interventions.kind ('mow' | 'trim' | 'weed')
    pub date: NaiveDate,                   // ⇔ interventions.date (TEXT "YYYY-MM-DD")
    pub started_at: Option<DateTime<Local>>, // ⇔ interventions.started_at (RFC3339)
    pub ended_at: Option<DateTime<Local>>, // ⇔ interventions.ended_at (RFC3339)
    pub duration_minutes: Option<i64>,     // ⇔ interventions.duration_minutes
    pub status: InterventionStatus,        // ⇔ interventions.status
    pub notes: String,                     // ⇔ interventions.notes
    pub created_at: String,                // ⇔ interventions.created_at (ISO8601)
}

impl Intervention {
    /// A visit logged after the fact.
    pub fn completed(job_site_id: i64, kind: InterventionType, date: NaiveDate) -> Self {
        Self {
            id: 0,
            job_site_id,
            kind,
            date,
            started_at: None,
            ended_at: None,
            duration_minutes: None,
            status: InterventionStatus::Completed,
            notes: String::new(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    /// A visit whose stopwatch has just been started.
    pub fn in_progress(job_site_id: i64, kind: InterventionType, started_at: DateTime<Local>) -> Self {
        Self {
            id: 0,
            job_site_id,
            kind,
            date: started_at.date_naive(),
            started_at: Some(started_at),
            ended_at: None,
            duration_minutes: None,
            status: InterventionStatus::InProgress,
            notes: String::new(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    /// Close the visit: store end, duration and notes, flip to completed.
    pub fn complete(&mut self, ended_at: DateTime<Local>, notes: Option<&str>) {
        self.ended_at = Some(ended_at);
        self.duration_minutes = self
            .started_at
            .map(|start| (ended_at - start).num_minutes().max(0));
        self.status = InterventionStatus::Completed;

        if let Some(n) = notes.map(str::trim).filter(|n| !n.is_empty()) {
            self.notes = n.to_string();
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == InterventionStatus::Completed
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_range(&self) -> String {
        let fmt = |t: &Option<DateTime<Local>>| {
            t.map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string())
        };
        format!("{} → {}", fmt(&self.started_at), fmt(&self.ended_at))
    }
}
