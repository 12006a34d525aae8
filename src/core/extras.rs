use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{extras, job_sites};
use crate::errors::{AppError, AppResult};
use crate::models::extra::{Extra, ExtraStatus, ExtraTarget};
use chrono::NaiveDate;

pub struct ExtraLogic;

impl ExtraLogic {
    pub fn add(
        pool: &mut DbPool,
        target: ExtraTarget,
        description: &str,
        date: NaiveDate,
        amount: f64,
        notes: Option<&str>,
    ) -> AppResult<Extra> {
        if description.trim().is_empty() {
            return Err(AppError::Validation("Description cannot be empty.".into()));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::Validation(format!(
                "Invalid amount: {}",
                amount
            )));
        }

        let billed_to = match &target {
            ExtraTarget::Site(id) => job_sites::get(&pool.conn, *id)?.client_name,
            ExtraTarget::Client(name) => name.clone(),
        };

        let mut extra = Extra::new(target, description, date, amount);
        if let Some(n) = notes {
            extra.notes = n.trim().to_string();
        }
        extra.id = extras::insert(&pool.conn, &extra)?;

        audit_quiet(
            &pool.conn,
            "extra_add",
            &format!("extra #{}", extra.id),
            &format!("{:.2} for '{}': {}", amount, billed_to, extra.description),
        );

        Ok(extra)
    }

    pub fn mark_invoiced(pool: &mut DbPool, id: i64) -> AppResult<Extra> {
        let mut extra = extras::get(&pool.conn, id)?;

        if extra.status == ExtraStatus::Invoiced {
            return Err(AppError::Validation(format!(
                "Extra #{} is already invoiced.",
                id
            )));
        }

        extras::set_status(&pool.conn, id, ExtraStatus::Invoiced)?;
        extra.status = ExtraStatus::Invoiced;

        audit_quiet(&pool.conn, "extra_invoice", &format!("extra #{}", id), "Marked as invoiced");
        Ok(extra)
    }

    pub fn delete(pool: &mut DbPool, id: i64) -> AppResult<()> {
        extras::delete(&pool.conn, id)?;
        audit_quiet(&pool.conn, "extra_del", &format!("extra #{}", id), "Deleted extra");
        Ok(())
    }
}
