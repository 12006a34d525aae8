use crate::cli::parser::{Commands, VisitAction};
use crate::config::Config;
use crate::core::interventions::VisitLogic;
use crate::db::interventions::{self, InterventionFilter};
use crate::db::job_sites;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::range::parse_range;
use crate::ui::messages::{info, success};
use crate::utils::date::parse_date_or_today;
use crate::utils::mins2readable;
use crate::utils::table::Table;
use crate::utils::time::parse_optional_time;
use std::collections::HashMap;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Visit { action } = cmd {
        let mut pool = DbPool::open_initialized(&cfg.database)?;

        match action {
            VisitAction::Add {
                site,
                kind,
                date,
                start,
                end,
                notes,
            } => {
                let date = parse_date_or_today(date.as_deref())?;
                let start = parse_optional_time(start.as_deref())?;
                let end = parse_optional_time(end.as_deref())?;

                let iv = VisitLogic::add(&mut pool, *site, *kind, date, start, end, notes.as_deref())?;

                success(format!(
                    "Visit #{} recorded: {} on {}{}",
                    iv.id,
                    iv.kind.label(),
                    iv.date_str(),
                    iv.duration_minutes
                        .map(|m| format!(" ({})", mins2readable(m)))
                        .unwrap_or_default()
                ));
            }

            VisitAction::List {
                site,
                kind,
                status,
                period,
            } => {
                let filter = InterventionFilter {
                    job_site_id: *site,
                    kind: *kind,
                    status: *status,
                    range: period.as_deref().map(parse_range).transpose()?,
                };
                list(&pool, cfg, &filter)?;
            }

            VisitAction::Finish { id, end, notes } => {
                let end = parse_optional_time(end.as_deref())?;
                let iv = VisitLogic::finish(&mut pool, *id, end, notes.as_deref())?;

                success(format!(
                    "Visit #{} completed ({}).",
                    iv.id,
                    mins2readable(iv.duration_minutes.unwrap_or(0))
                ));
            }

            VisitAction::Del { id } => {
                let iv = VisitLogic::delete(&mut pool, *id)?;
                success(format!(
                    "Visit #{} deleted ({} of {}).",
                    iv.id,
                    iv.kind.label(),
                    iv.date_str()
                ));
            }
        }
    }

    Ok(())
}

fn list(pool: &DbPool, cfg: &Config, filter: &InterventionFilter) -> AppResult<()> {
    let ivs = interventions::list(&pool.conn, filter)?;

    if ivs.is_empty() {
        info("No visits found.");
        return Ok(());
    }

    let names: HashMap<i64, String> = job_sites::list_all(&pool.conn)?
        .into_iter()
        .map(|s| (s.id, s.client_name))
        .collect();

    let sep = cfg.separator_char.chars().next().unwrap_or('-');
    let mut table = Table::new(
        &["ID", "Date", "Client", "Type", "Time", "Duration", "Status", "Notes"],
        sep,
    );

    let mut total = 0;
    for iv in &ivs {
        total += iv.duration_minutes.unwrap_or(0);
        table.add_row(vec![
            iv.id.to_string(),
            iv.date_str(),
            names.get(&iv.job_site_id).cloned().unwrap_or_default(),
            iv.kind.label().to_string(),
            iv.time_range(),
            iv.duration_minutes.map(mins2readable).unwrap_or_default(),
            iv.status.to_db_str().to_string(),
            iv.notes.clone(),
        ]);
    }

    print!("{}", table.render());
    println!("\n{} visit(s), {} timed", ivs.len(), mins2readable(total));
    Ok(())
}
