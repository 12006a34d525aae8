use crate::core::geocode::{Geocoder, resolve_coordinates};
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{job_sites, weedings};
use crate::errors::{AppError, AppResult};
use crate::models::client_type::ClientType;
use crate::models::coordinates::Coordinates;
use crate::models::intervention_type::InterventionType;
use crate::models::job_site::JobSite;
use rusqlite::Connection;

/// Where a site's coordinates come from.
pub enum Placement<'a> {
    /// Explicit values typed by the user.
    Manual(Coordinates),
    /// Look the address up.
    Geocode(&'a dyn Geocoder),
    /// Leave the coordinates empty.
    Skip,
}

pub struct NewSite {
    pub client_name: String,
    pub client_type: ClientType,
    pub address: String,
    pub services: Option<Vec<InterventionType>>,
    pub notes: Option<String>,
}

/// Fields to change on an existing site; `None` keeps the current value.
#[derive(Default)]
pub struct SiteChanges {
    pub client_name: Option<String>,
    pub client_type: Option<ClientType>,
    pub address: Option<String>,
    pub services: Option<Vec<InterventionType>>,
    pub notes: Option<String>,
}

/// Rows touched by a site deletion.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub interventions: i64,
    pub planned_weedings: i64,
    pub extras_detached: i64,
}

pub struct SiteLogic;

fn place(site: &mut JobSite, placement: Placement<'_>) {
    match placement {
        Placement::Manual(c) => site.set_coordinates(Some(c)),
        Placement::Geocode(g) => site.set_coordinates(resolve_coordinates(g, &site.address)),
        Placement::Skip => {}
    }
}

fn count_children(conn: &Connection, table: &str, id: i64) -> AppResult<i64> {
    let n = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE job_site_id = ?1"),
        [id],
        |row| row.get(0),
    )?;
    Ok(n)
}

impl SiteLogic {
    pub fn add(pool: &mut DbPool, input: NewSite, placement: Placement<'_>) -> AppResult<JobSite> {
        if input.client_name.trim().is_empty() {
            return Err(AppError::Validation("Client name cannot be empty.".into()));
        }

        let mut site = JobSite::new(&input.client_name, input.client_type, &input.address);

        if let Some(services) = &input.services {
            site.set_services(services);
        }
        if let Some(notes) = input.notes {
            site.notes = notes.trim().to_string();
        }

        place(&mut site, placement);

        site.id = job_sites::insert(&pool.conn, &site)?;

        audit_quiet(
            &pool.conn,
            "site_add",
            &format!("site #{}", site.id),
            &format!("Added job site '{}'", site.client_name),
        );

        Ok(site)
    }

    /// Apply `changes`; an address change re-runs `placement` unless coordinates were given.
    pub fn edit(
        pool: &mut DbPool,
        id: i64,
        changes: SiteChanges,
        placement: Placement<'_>,
    ) -> AppResult<JobSite> {
        let mut site = job_sites::get(&pool.conn, id)?;
        let address_changed = changes
            .address
            .as_deref()
            .is_some_and(|a| a.trim() != site.address);

        if let Some(name) = changes.client_name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Client name cannot be empty.".into()));
            }
            site.client_name = name.trim().to_string();
        }
        if let Some(t) = changes.client_type {
            site.client_type = t;
        }
        if let Some(address) = changes.address {
            site.address = address.trim().to_string();
        }
        if let Some(services) = &changes.services {
            site.set_services(services);
        }
        if let Some(notes) = changes.notes {
            site.notes = notes.trim().to_string();
        }

        match placement {
            Placement::Manual(_) => place(&mut site, placement),
            Placement::Geocode(_) if address_changed => place(&mut site, placement),
            _ => {}
        }

        job_sites::update(&pool.conn, &site)?;

        audit_quiet(
            &pool.conn,
            "site_edit",
            &format!("site #{}", site.id),
            &format!("Updated job site '{}'", site.client_name),
        );

        Ok(site)
    }

    pub fn delete(pool: &mut DbPool, id: i64) -> AppResult<DeleteReport> {
        let site = job_sites::get(&pool.conn, id)?;

        let report = DeleteReport {
            interventions: count_children(&pool.conn, "interventions", id)?,
            planned_weedings: weedings::list_for_site(&pool.conn, id)?.len() as i64,
            extras_detached: count_children(&pool.conn, "extras", id)?,
        };

        job_sites::delete(&pool.conn, id)?;

        audit_quiet(
            &pool.conn,
            "site_del",
            &format!("site #{}", id),
            &format!(
                "Deleted job site '{}' ({} interventions, {} plans removed; {} extras detached)",
                site.client_name,
                report.interventions,
                report.planned_weedings,
                report.extras_detached
            ),
        );

        Ok(report)
    }
}
