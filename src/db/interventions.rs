use crate::db::convert::{date_to_sql, parse_date_col, parse_enum_col, parse_ts_col, ts_to_sql};
use crate::errors::{AppError, AppResult};
use crate::models::intervention::{Intervention, InterventionStatus};
use crate::models::intervention_type::InterventionType;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};

const COLUMNS: &str = "id, job_site_id, kind, date, started_at, ended_at,
                       duration_minutes, status, notes, created_at";

pub fn map_row(row: &Row) -> rusqlite::Result<Intervention> {
    let kind_str: String = row.get("kind")?;
    let kind = parse_enum_col(
        2,
        &kind_str,
        InterventionType::from_db_str,
        AppError::InvalidInterventionType,
    )?;

    let date_str: String = row.get("date")?;
    let status_str: String = row.get("status")?;

    Ok(Intervention {
        id: row.get("id")?,
        job_site_id: row.get("job_site_id")?,
        kind,
        date: parse_date_col(3, &date_str)?,
        started_at: parse_ts_col(4, row.get("started_at")?)?,
        ended_at: parse_ts_col(5, row.get("ended_at")?)?,
        duration_minutes: row.get("duration_minutes")?,
        status: parse_enum_col(
            7,
            &status_str,
            InterventionStatus::from_db_str,
            AppError::InvalidStatus,
        )?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert(conn: &Connection, iv: &Intervention) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO interventions
            (job_site_id, kind, date, started_at, ended_at, duration_minutes,
             status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            iv.job_site_id,
            iv.kind.to_db_str(),
            date_to_sql(&iv.date),
            ts_to_sql(&iv.started_at),
            ts_to_sql(&iv.ended_at),
            iv.duration_minutes,
            iv.status.to_db_str(),
            iv.notes,
            iv.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, iv: &Intervention) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE interventions
            SET kind = ?1, date = ?2, started_at = ?3, ended_at = ?4,
                duration_minutes = ?5, status = ?6, notes = ?7
          WHERE id = ?8",
        params![
            iv.kind.to_db_str(),
            date_to_sql(&iv.date),
            ts_to_sql(&iv.started_at),
            ts_to_sql(&iv.ended_at),
            iv.duration_minutes,
            iv.status.to_db_str(),
            iv.notes,
            iv.id,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Intervention",
            id: iv.id,
        });
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM interventions WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Intervention",
            id,
        });
    }
    Ok(())
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Intervention>> {
    let iv = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM interventions WHERE id = ?1"),
            [id],
            map_row,
        )
        .optional()?;
    Ok(iv)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Intervention> {
    find(conn, id)?.ok_or(AppError::NotFound {
        entity: "Intervention",
        id,
    })
}

/// Optional filters for [`list`]; `None` means "any".
#[derive(Debug, Default, Clone)]
pub struct InterventionFilter {
    pub job_site_id: Option<i64>,
    pub kind: Option<InterventionType>,
    pub status: Option<InterventionStatus>,
    pub range: Option<(NaiveDate, NaiveDate)>,
}

/// Interventions matching `filter`, newest first.
pub fn list(conn: &Connection, filter: &InterventionFilter) -> AppResult<Vec<Intervention>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(site) = filter.job_site_id {
        clauses.push("job_site_id = ?");
        values.push(Box::new(site));
    }
    if let Some(kind) = filter.kind {
        clauses.push("kind = ?");
        values.push(Box::new(kind.to_db_str()));
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Box::new(status.to_db_str()));
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

    let sql = format!(
        "SELECT {COLUMNS} FROM interventions {where_sql} ORDER BY date DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter().map(|v| v.as_ref())), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_for_site(conn: &Connection, job_site_id: i64) -> AppResult<Vec<Intervention>> {
    list(
        conn,
        &InterventionFilter {
            job_site_id: Some(job_site_id),
            ..Default::default()
        },
    )
}

pub fn list_all(conn: &Connection) -> AppResult<Vec<Intervention>> {
    list(conn, &InterventionFilter::default())
}

pub fn list_in_progress(conn: &Connection) -> AppResult<Vec<Intervention>> {
    list(
        conn,
        &InterventionFilter {
            status: Some(InterventionStatus::InProgress),
            ..Default::default()
        },
    )
}
