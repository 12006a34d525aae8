use crate::cli::parser::{Commands, WeedingAction};
use crate::config::Config;
use crate::core::views::weeding_rows;
use crate::core::weedings::WeedingLogic;
use crate::db::pool::DbPool;
use crate::db::{job_sites, weedings};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RED, RESET};
use crate::utils::date::{parse_date, parse_date_or_today, relative_days, today};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Weeding { action } = cmd {
        let mut pool = DbPool::open_initialized(&cfg.database)?;

        match action {
            WeedingAction::Plan { site, date, notes } => {
                let date = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.clone()))?;
                let plan = WeedingLogic::plan(&mut pool, *site, date, notes.as_deref())?;
                success(format!(
                    "Weeding #{} planned for {}.",
                    plan.id,
                    plan.planned_date.format("%Y-%m-%d")
                ));
            }

            WeedingAction::List { pending } => {
                let plans = weedings::list(&pool.conn, *pending)?;
                let sites = job_sites::list_all(&pool.conn)?;
                let today = today();
                let rows = weeding_rows(&plans, &sites, today);

                if rows.is_empty() {
                    info("No weeding planned.");
                    return Ok(());
                }

                let sep = cfg.separator_char.chars().next().unwrap_or('-');
                let mut table = Table::new(&["ID", "Date", "When", "Client", "Status", "Notes"], sep);

                for r in &rows {
                    let status = if r.plan.done {
                        format!("{GREY}done{RESET}")
                    } else if r.late {
                        format!("{RED}late{RESET}")
                    } else {
                        "pending".to_string()
                    };

                    table.add_row(vec![
                        r.plan.id.to_string(),
                        r.plan.planned_date.format("%Y-%m-%d").to_string(),
                        relative_days(r.plan.planned_date, today),
                        r.client_name.clone(),
                        status,
                        r.plan.notes.clone(),
                    ]);
                }

                print!("{}", table.render());
                let late = rows.iter().filter(|r| r.late).count();
                if late > 0 {
                    println!("\n{RED}{late} late pass(es){RESET}");
                }
            }

            WeedingAction::Done { id, date } => {
                let done_on = parse_date_or_today(date.as_deref())?;
                let iv = WeedingLogic::mark_done(&mut pool, *id, done_on)?;
                success(format!(
                    "Weeding #{} done; visit #{} logged on {}.",
                    id,
                    iv.id,
                    iv.date_str()
                ));
            }

            WeedingAction::Del { id } => {
                WeedingLogic::delete(&mut pool, *id)?;
                success(format!("Weeding #{} deleted.", id));
            }
        }
    }

    Ok(())
}
