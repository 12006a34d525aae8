use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraStatus {
    ToInvoice,
    Invoiced,
}

impl ExtraStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ExtraStatus::ToInvoice => "to_invoice",
            ExtraStatus::Invoiced => "invoiced",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "to_invoice" => Some(ExtraStatus::ToInvoice),
            "invoiced" => Some(ExtraStatus::Invoiced),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtraStatus::ToInvoice => "to invoice",
            ExtraStatus::Invoiced => "invoiced",
        }
    }
}

/// Who an extra is billed to: a known job site or a free-text client.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraTarget {
    Site(i64),
    Client(String),
}

impl ExtraTarget {
    /// Exactly one of the two references must be given.
    pub fn resolve(site: Option<i64>, client: Option<&str>) -> AppResult<Self> {
        let client = client.map(str::trim).filter(|c| !c.is_empty());

        match (site, client) {
            (Some(id), None) => Ok(ExtraTarget::Site(id)),
            (None, Some(name)) => Ok(ExtraTarget::Client(name.to_string())),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "An extra references either a job site or a client name, not both.".into(),
            )),
            (None, None) => Err(AppError::Validation(
                "An extra needs a job site (--site) or a client name (--client).".into(),
            )),
        }
    }
}

/// Amounts are kept to the cent.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Billable work performed outside the recurring contract.
#[derive(Debug, Clone, Serialize)]
pub struct Extra {
    pub id: i64,
    pub job_site_id: Option<i64>,     // ⇔ extras.job_site_id (FK, SET NULL on delete)
    pub client_label: Option<String>, // ⇔ extras.client_label (free-text reference)
    pub description: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub status: ExtraStatus,
    pub notes: String,
    pub created_at: String,
}

impl Extra {
    pub fn new(target: ExtraTarget, description: &str, date: NaiveDate, amount: f64) -> Self {
        let (job_site_id, client_label) = match target {
            ExtraTarget::Site(id) => (Some(id), None),
            ExtraTarget::Client(name) => (None, Some(name)),
        };

        Self {
            id: 0,
            job_site_id,
            client_label,
            description: description.trim().to_string(),
            date,
            amount: from_cents(to_cents(amount)),
            status: ExtraStatus::ToInvoice,
            notes: String::new(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    pub fn amount_cents(&self) -> i64 {
        to_cents(self.amount)
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
