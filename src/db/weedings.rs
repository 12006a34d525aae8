use crate::db::convert::{date_to_sql, parse_date_col};
use crate::errors::{AppError, AppResult};
use crate::models::planned_weeding::PlannedWeeding;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, job_site_id, planned_date, done, notes, created_at";

pub fn map_row(row: &Row) -> rusqlite::Result<PlannedWeeding> {
    let date_str: String = row.get("planned_date")?;

    Ok(PlannedWeeding {
        id: row.get("id")?,
        job_site_id: row.get("job_site_id")?,
        planned_date: parse_date_col(2, &date_str)?,
        done: row.get("done")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert(conn: &Connection, plan: &PlannedWeeding) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO planned_weedings (job_site_id, planned_date, done, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            plan.job_site_id,
            date_to_sql(&plan.planned_date),
            plan.done,
            plan.notes,
            plan.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_done(conn: &Connection, id: i64, done: bool) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE planned_weedings SET done = ?1 WHERE id = ?2",
        params![done, id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Planned weeding",
            id,
        });
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM planned_weedings WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Planned weeding",
            id,
        });
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> AppResult<PlannedWeeding> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM planned_weedings WHERE id = ?1"),
        [id],
        map_row,
    )
    .optional()?
    .ok_or(AppError::NotFound {
        entity: "Planned weeding",
        id,
    })
}

/// Plans ordered by date; `pending_only` hides the ones already done.
pub fn list(conn: &Connection, pending_only: bool) -> AppResult<Vec<PlannedWeeding>> {
    let sql = if pending_only {
        format!("SELECT {COLUMNS} FROM planned_weedings WHERE done = 0 ORDER BY planned_date ASC, id ASC")
    } else {
        format!("SELECT {COLUMNS} FROM planned_weedings ORDER BY planned_date ASC, id ASC")
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_for_site(conn: &Connection, job_site_id: i64) -> AppResult<Vec<PlannedWeeding>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM planned_weedings WHERE job_site_id = ?1 ORDER BY planned_date ASC"
    ))?;
    let rows = stmt.query_map([job_site_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
