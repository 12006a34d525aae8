// src/export/model.rs

use crate::core::views::{ExtraRow, SiteRow};
use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use crate::utils::formatting::format_amount;
use clap::ValueEnum;
use serde::Serialize;

/// Which records an export contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    Sites,
    Visits,
    Extras,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Sites => "sites",
            ExportKind::Visits => "visits",
            ExportKind::Extras => "extras",
        }
    }
}

/// A flat record that every output format can render.
pub(crate) trait ExportRecord: Serialize {
    fn headers() -> &'static [&'static str];
    fn to_row(&self) -> Vec<String>;
}

pub(crate) fn to_table<T: ExportRecord>(items: &[T]) -> Vec<Vec<String>> {
    items.iter().map(ExportRecord::to_row).collect()
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

#[derive(Serialize, Clone, Debug)]
pub struct SiteExport {
    pub id: i64,
    pub client: String,
    pub client_type: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub services: String,
    pub mow: String,
    pub trim: String,
    pub weed: String,
    pub last_visit: Option<String>,
}

impl From<&SiteRow> for SiteExport {
    fn from(r: &SiteRow) -> Self {
        let urgency = |kind| {
            r.status(kind)
                .map(|s| s.urgency.label().to_string())
                .unwrap_or_default()
        };
        Self {
            id: r.site.id,
            client: r.site.client_name.clone(),
            client_type: r.site.client_type.label().to_string(),
            address: r.site.address.clone(),
            latitude: r.site.latitude,
            longitude: r.site.longitude,
            services: r.site.services_label(),
            mow: urgency(InterventionType::Mow),
            trim: urgency(InterventionType::Trim),
            weed: urgency(InterventionType::Weed),
            last_visit: r.last_visit.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl ExportRecord for SiteExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "client", "type", "address", "lat", "lon", "services", "mow", "trim", "weed",
            "last_visit",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.client.clone(),
            self.client_type.clone(),
            self.address.clone(),
            opt(&self.latitude.map(|v| format!("{v:.5}"))),
            opt(&self.longitude.map(|v| format!("{v:.5}"))),
            self.services.clone(),
            self.mow.clone(),
            self.trim.clone(),
            self.weed.clone(),
            opt(&self.last_visit),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct VisitExport {
    pub id: i64,
    pub site_id: i64,
    pub client: String,
    pub kind: String,
    pub date: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub minutes: Option<i64>,
    pub status: String,
    pub notes: String,
}

impl VisitExport {
    pub fn new(iv: &Intervention, client: &str) -> Self {
        Self {
            id: iv.id,
            site_id: iv.job_site_id,
            client: client.to_string(),
            kind: iv.kind.to_db_str().to_string(),
            date: iv.date_str(),
            start: iv.started_at.map(|t| t.format("%H:%M").to_string()),
            end: iv.ended_at.map(|t| t.format("%H:%M").to_string()),
            minutes: iv.duration_minutes,
            status: iv.status.to_db_str().to_string(),
            notes: iv.notes.clone(),
        }
    }
}

impl ExportRecord for VisitExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "site", "client", "type", "date", "start", "end", "minutes", "status", "notes",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.site_id.to_string(),
            self.client.clone(),
            self.kind.clone(),
            self.date.clone(),
            opt(&self.start),
            opt(&self.end),
            opt(&self.minutes),
            self.status.clone(),
            self.notes.clone(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ExtraExport {
    pub id: i64,
    pub billed_to: String,
    pub site_id: Option<i64>,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub status: String,
    pub notes: String,
}

impl From<&ExtraRow> for ExtraExport {
    fn from(r: &ExtraRow) -> Self {
        Self {
            id: r.extra.id,
            billed_to: r.billed_to.clone(),
            site_id: r.extra.job_site_id,
            date: r.extra.date_str(),
            description: r.extra.description.clone(),
            amount: r.extra.amount,
            status: r.extra.status.to_db_str().to_string(),
            notes: r.extra.notes.clone(),
        }
    }
}

impl ExportRecord for ExtraExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "billed_to", "site", "date", "description", "amount", "status", "notes",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.billed_to.clone(),
            opt(&self.site_id),
            self.date.clone(),
            self.description.clone(),
            format_amount(self.amount),
            self.status.clone(),
            self.notes.clone(),
        ]
    }
}
