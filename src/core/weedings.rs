use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{interventions, job_sites, weedings};
use crate::errors::{AppError, AppResult};
use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use crate::models::planned_weeding::PlannedWeeding;
use chrono::NaiveDate;

pub struct WeedingLogic;

impl WeedingLogic {
    pub fn plan(
        pool: &mut DbPool,
        job_site_id: i64,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> AppResult<PlannedWeeding> {
        let site = job_sites::get(&pool.conn, job_site_id)?;

        let mut plan = PlannedWeeding::new(job_site_id, date, notes);
        plan.id = weedings::insert(&pool.conn, &plan)?;

        audit_quiet(
            &pool.conn,
            "weeding_plan",
            &format!("plan #{}", plan.id),
            &format!("Weeding planned on '{}' for {}", site.client_name, date),
        );

        Ok(plan)
    }

    /// Mark a plan done and log the matching weeding visit on `done_on`.
    pub fn mark_done(pool: &mut DbPool, id: i64, done_on: NaiveDate) -> AppResult<Intervention> {
        let plan = weedings::get(&pool.conn, id)?;

        if plan.done {
            return Err(AppError::Validation(format!(
                "Planned weeding #{} is already done.",
                id
            )));
        }

        let tx = pool.conn.transaction()?;

        weedings::set_done(&tx, id, true)?;

        let mut iv = Intervention::completed(plan.job_site_id, InterventionType::Weed, done_on);
        iv.notes = plan.notes.clone();
        iv.id = interventions::insert(&tx, &iv)?;

        tx.commit()?;

        audit_quiet(
            &pool.conn,
            "weeding_done",
            &format!("plan #{}", id),
            &format!("Weeding done, logged as visit #{}", iv.id),
        );

        Ok(iv)
    }

    pub fn delete(pool: &mut DbPool, id: i64) -> AppResult<()> {
        weedings::delete(&pool.conn, id)?;
        audit_quiet(&pool.conn, "weeding_del", &format!("plan #{}", id), "Deleted planned weeding");
        Ok(())
    }
}
