//! Display-ready lists built from stored records plus search/sort/filter
//! state. Everything here is a pure transformation; the caller loads the
//! records and renders the rows.

use crate::config::Thresholds;
use crate::core::urgency::{ServiceHistory, Urgency, classify_service};
use crate::models::extra::{Extra, ExtraStatus, from_cents};
use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use crate::models::job_site::JobSite;
use crate::models::planned_weeding::PlannedWeeding;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SiteSort {
    /// Most urgent first
    #[default]
    Urgency,
    /// Client name, A → Z
    Name,
    /// Longest without a visit first
    LastVisit,
}

#[derive(Debug, Clone, Default)]
pub struct SiteListQuery {
    pub search: Option<String>,
    pub sort: SiteSort,
    /// Only sites where this service is active; urgency is then judged on it alone.
    pub service: Option<InterventionType>,
    /// Hide sites whose urgency is green.
    pub urgent_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub kind: InterventionType,
    pub last_date: Option<NaiveDate>,
    pub days_since: Option<i64>,
    pub count_this_year: u32,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteRow {
    pub site: JobSite,
    /// One entry per active service.
    pub services: Vec<ServiceStatus>,
    pub last_visit: Option<NaiveDate>,
    pub next_weeding: Option<NaiveDate>,
}

impl SiteRow {
    pub fn status(&self, kind: InterventionType) -> Option<&ServiceStatus> {
        self.services.iter().find(|s| s.kind == kind)
    }

    fn focus(&self, service: Option<InterventionType>) -> impl Iterator<Item = &ServiceStatus> {
        self.services
            .iter()
            .filter(move |s| service.is_none_or(|k| s.kind == k))
    }

    /// Worst urgency over the focused services; `None` when no service is active.
    pub fn worst(&self, service: Option<InterventionType>) -> Option<Urgency> {
        self.focus(service).map(|s| s.urgency).max()
    }

    /// Elapsed days used to break urgency ties; never done ranks above any count.
    fn overdue_days(&self, service: Option<InterventionType>) -> i64 {
        self.focus(service)
            .map(|s| s.days_since.unwrap_or(i64::MAX))
            .max()
            .unwrap_or(i64::MIN)
    }
}

/// Per-service status of one site.
pub fn site_row(
    site: &JobSite,
    interventions: &[Intervention],
    plans: &[PlannedWeeding],
    thresholds: &Thresholds,
    today: NaiveDate,
) -> SiteRow {
    let own: Vec<Intervention> = interventions
        .iter()
        .filter(|i| i.job_site_id == site.id)
        .cloned()
        .collect();

    let limits = thresholds.for_client(site.client_type);

    let services = site
        .active_services()
        .into_iter()
        .map(|kind| {
            let history = ServiceHistory::from_interventions(&own, kind, today);
            ServiceStatus {
                kind,
                last_date: history.last_date,
                days_since: history.days_since_last(today),
                count_this_year: history.count_this_year,
                urgency: classify_service(kind, &history, limits.get(kind), today),
            }
        })
        .collect();

    let last_visit = own
        .iter()
        .filter(|i| i.is_completed())
        .map(|i| i.date)
        .max();

    let next_weeding = plans
        .iter()
        .filter(|p| p.job_site_id == site.id && !p.done)
        .map(|p| p.planned_date)
        .min();

    SiteRow {
        site: site.clone(),
        services,
        last_visit,
        next_weeding,
    }
}

fn matches_search(site: &JobSite, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty()
        || site.client_name.to_lowercase().contains(&needle)
        || site.address.to_lowercase().contains(&needle)
}

fn by_name(a: &SiteRow, b: &SiteRow) -> Ordering {
    a.site
        .client_name
        .to_lowercase()
        .cmp(&b.site.client_name.to_lowercase())
        .then(a.site.id.cmp(&b.site.id))
}

/// Filter and sort sites for the job list.
pub fn build_site_rows(
    sites: &[JobSite],
    interventions: &[Intervention],
    plans: &[PlannedWeeding],
    thresholds: &Thresholds,
    today: NaiveDate,
    query: &SiteListQuery,
) -> Vec<SiteRow> {
    let mut rows: Vec<SiteRow> = sites
        .iter()
        .filter(|s| query.search.as_deref().is_none_or(|q| matches_search(s, q)))
        .filter(|s| query.service.is_none_or(|k| s.is_active(k)))
        .map(|s| site_row(s, interventions, plans, thresholds, today))
        .filter(|r| !query.urgent_only || r.worst(query.service) > Some(Urgency::Green))
        .collect();

    let service = query.service;

    match query.sort {
        SiteSort::Urgency => rows.sort_by(|a, b| {
            b.worst(service)
                .cmp(&a.worst(service))
                .then(b.overdue_days(service).cmp(&a.overdue_days(service)))
                .then_with(|| by_name(a, b))
        }),
        SiteSort::Name => rows.sort_by(by_name),
        // Option orders None first, so never-visited sites lead.
        SiteSort::LastVisit => rows.sort_by(|a, b| {
            a.last_visit
                .cmp(&b.last_visit)
                .then_with(|| by_name(a, b))
        }),
    }

    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct WeedingRow {
    pub plan: PlannedWeeding,
    pub client_name: String,
    pub late: bool,
}

pub fn weeding_rows(plans: &[PlannedWeeding], sites: &[JobSite], today: NaiveDate) -> Vec<WeedingRow> {
    let names: HashMap<i64, &str> = sites
        .iter()
        .map(|s| (s.id, s.client_name.as_str()))
        .collect();

    let mut rows: Vec<WeedingRow> = plans
        .iter()
        .map(|p| WeedingRow {
            plan: p.clone(),
            client_name: names
                .get(&p.job_site_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("#{}", p.job_site_id)),
            late: p.is_late(today),
        })
        .collect();

    // Late plans first, then by date.
    rows.sort_by_key(|r| (Reverse(r.late), r.plan.done, r.plan.planned_date, r.plan.id));
    rows
}

pub const DELETED_SITE_LABEL: &str = "(deleted site)";

#[derive(Debug, Clone, Serialize)]
pub struct ExtraRow {
    pub extra: Extra,
    pub billed_to: String,
}

/// Resolve who each extra is billed to.
pub fn extra_rows(extras: &[Extra], sites: &[JobSite]) -> Vec<ExtraRow> {
    let names: HashMap<i64, &str> = sites
        .iter()
        .map(|s| (s.id, s.client_name.as_str()))
        .collect();

    extras
        .iter()
        .map(|e| {
            let billed_to = e
                .job_site_id
                .and_then(|id| names.get(&id).map(|n| n.to_string()))
                .or_else(|| e.client_label.clone())
                .unwrap_or_else(|| DELETED_SITE_LABEL.to_string());

            ExtraRow {
                extra: e.clone(),
                billed_to,
            }
        })
        .collect()
}

/// Summed in cents so the total matches the invoice lines.
pub fn total_to_invoice(extras: &[Extra]) -> f64 {
    let cents: i64 = extras
        .iter()
        .filter(|e| e.status == ExtraStatus::ToInvoice)
        .map(Extra::amount_cents)
        .sum();
    from_cents(cents)
}
