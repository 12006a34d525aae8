use crate::db::convert::parse_enum_col;
use crate::errors::{AppError, AppResult};
use crate::models::client_type::ClientType;
use crate::models::job_site::JobSite;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, client_name, client_type, address, latitude, longitude,
                       mow_enabled, trim_enabled, weed_enabled, notes, created_at";

pub fn map_row(row: &Row) -> rusqlite::Result<JobSite> {
    let type_str: String = row.get("client_type")?;
    let client_type = parse_enum_col(
        2,
        &type_str,
        ClientType::from_db_str,
        AppError::InvalidClientType,
    )?;

    Ok(JobSite {
        id: row.get("id")?,
        client_name: row.get("client_name")?,
        client_type,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        mow_enabled: row.get("mow_enabled")?,
        trim_enabled: row.get("trim_enabled")?,
        weed_enabled: row.get("weed_enabled")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

/// Insert a site and return its new id.
pub fn insert(conn: &Connection, site: &JobSite) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO job_sites
            (client_name, client_type, address, latitude, longitude,
             mow_enabled, trim_enabled, weed_enabled, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            site.client_name,
            site.client_type.to_db_str(),
            site.address,
            site.latitude,
            site.longitude,
            site.mow_enabled,
            site.trim_enabled,
            site.weed_enabled,
            site.notes,
            site.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, site: &JobSite) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE job_sites
            SET client_name = ?1, client_type = ?2, address = ?3,
                latitude = ?4, longitude = ?5,
                mow_enabled = ?6, trim_enabled = ?7, weed_enabled = ?8,
                notes = ?9
          WHERE id = ?10",
        params![
            site.client_name,
            site.client_type.to_db_str(),
            site.address,
            site.latitude,
            site.longitude,
            site.mow_enabled,
            site.trim_enabled,
            site.weed_enabled,
            site.notes,
            site.id,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Job site",
            id: site.id,
        });
    }
    Ok(())
}

/// Delete a site; its interventions and plans go with it, extras keep a null reference.
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM job_sites WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Job site",
            id,
        });
    }
    Ok(())
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<JobSite>> {
    let site = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM job_sites WHERE id = ?1"),
            [id],
            map_row,
        )
        .optional()?;
    Ok(site)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<JobSite> {
    find(conn, id)?.ok_or(AppError::NotFound {
        entity: "Job site",
        id,
    })
}

pub fn list_all(conn: &Connection) -> AppResult<Vec<JobSite>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM job_sites ORDER BY client_name COLLATE NOCASE ASC, id ASC"
    ))?;

    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
