use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{interventions, job_sites};
use crate::errors::{AppError, AppResult};
use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use crate::ui::messages::warning;
use crate::utils::time::local_datetime;
use chrono::{Local, NaiveDate, NaiveTime};

/// High-level logic for logging visits by hand.
pub struct VisitLogic;

impl VisitLogic {
    /// Record a completed visit, optionally with its start/end times.
    pub fn add(
        pool: &mut DbPool,
        job_site_id: i64,
        kind: InterventionType,
        date: NaiveDate,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
        notes: Option<&str>,
    ) -> AppResult<Intervention> {
        let site = job_sites::get(&pool.conn, job_site_id)?;

        if !site.is_active(kind) {
            warning(format!(
                "{} is not an active service on '{}'; the visit is recorded anyway.",
                kind.label(),
                site.client_name
            ));
        }

        let mut iv = Intervention::completed(job_site_id, kind, date);

        match (start, end) {
            (Some(s), Some(e)) => {
                if e <= s {
                    return Err(AppError::InvalidTime(
                        "OUT must be later than IN.".into(),
                    ));
                }
                iv.started_at = Some(local_datetime(date, s)?);
                iv.complete(local_datetime(date, e)?, notes);
            }
            (Some(s), None) => {
                iv.started_at = Some(local_datetime(date, s)?);
            }
            (None, Some(_)) => {
                return Err(AppError::InvalidTime(
                    "Cannot set OUT without IN.".into(),
                ));
            }
            (None, None) => {}
        }

        if let Some(n) = notes {
            iv.notes = n.trim().to_string();
        }

        iv.id = interventions::insert(&pool.conn, &iv)?;

        audit_quiet(
            &pool.conn,
            "visit_add",
            &format!("visit #{}", iv.id),
            &format!(
                "{} on '{}' ({})",
                kind.label(),
                site.client_name,
                iv.date_str()
            ),
        );

        Ok(iv)
    }

    /// Complete an in-progress visit left behind by an interrupted timer.
    pub fn finish(
        pool: &mut DbPool,
        id: i64,
        end: Option<NaiveTime>,
        notes: Option<&str>,
    ) -> AppResult<Intervention> {
        let mut iv = interventions::get(&pool.conn, id)?;

        if iv.is_completed() {
            return Err(AppError::Validation(format!(
                "Intervention #{} is already completed.",
                id
            )));
        }

        let ended_at = match end {
            Some(t) => local_datetime(iv.date, t)?,
            None => Local::now(),
        };

        if let Some(start) = iv.started_at
            && ended_at <= start
        {
            return Err(AppError::InvalidTime(
                "OUT must be later than the recorded start.".into(),
            ));
        }

        iv.complete(ended_at, notes);
        interventions::update(&pool.conn, &iv)?;

        audit_quiet(
            &pool.conn,
            "visit_finish",
            &format!("visit #{}", iv.id),
            &format!(
                "Completed manually ({} min)",
                iv.duration_minutes.unwrap_or(0)
            ),
        );

        Ok(iv)
    }

    pub fn delete(pool: &mut DbPool, id: i64) -> AppResult<Intervention> {
        let iv = interventions::get(&pool.conn, id)?;
        interventions::delete(&pool.conn, id)?;

        audit_quiet(
            &pool.conn,
            "visit_del",
            &format!("visit #{}", id),
            &format!("Deleted {} of {}", iv.kind.label(), iv.date_str()),
        );

        Ok(iv)
    }
}
