use crate::db::convert::{date_to_sql, parse_date_col, parse_enum_col};
use crate::errors::{AppError, AppResult};
use crate::models::extra::{Extra, ExtraStatus};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};

const COLUMNS: &str = "id, job_site_id, client_label, description, date, amount,
                       status, notes, created_at";

pub fn map_row(row: &Row) -> rusqlite::Result<Extra> {
    let date_str: String = row.get("date")?;
    let status_str: String = row.get("status")?;

    Ok(Extra {
        id: row.get("id")?,
        job_site_id: row.get("job_site_id")?,
        client_label: row.get("client_label")?,
        description: row.get("description")?,
        date: parse_date_col(4, &date_str)?,
        amount: row.get("amount")?,
        status: parse_enum_col(6, &status_str, ExtraStatus::from_db_str, AppError::InvalidStatus)?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert(conn: &Connection, extra: &Extra) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO extras
            (job_site_id, client_label, description, date, amount, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            extra.job_site_id,
            extra.client_label,
            extra.description,
            date_to_sql(&extra.date),
            extra.amount,
            extra.status.to_db_str(),
            extra.notes,
            extra.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_status(conn: &Connection, id: i64, status: ExtraStatus) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE extras SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound { entity: "Extra", id });
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM extras WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound { entity: "Extra", id });
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Extra> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM extras WHERE id = ?1"),
        [id],
        map_row,
    )
    .optional()?
    .ok_or(AppError::NotFound { entity: "Extra", id })
}

#[derive(Debug, Default, Clone)]
pub struct ExtraFilter {
    pub status: Option<ExtraStatus>,
    pub job_site_id: Option<i64>,
    pub range: Option<(NaiveDate, NaiveDate)>,
}

/// Extras matching `filter`, oldest first.
pub fn list(conn: &Connection, filter: &ExtraFilter) -> AppResult<Vec<Extra>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Box::new(status.to_db_str()));
    }
    if let Some(site) = filter.job_site_id {
        clauses.push("job_site_id = ?");
        values.push(Box::new(site));
    }
    if let Some((start, end)) = filter.range {
        clauses.push("date BETWEEN ? AND ?");
        values.push(Box::new(date_to_sql(&start)));
        values.push(Box::new(date_to_sql(&end)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM extras {where_sql} ORDER BY date ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter().map(|v| v.as_ref())), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
