use crate::cli::parser::{Commands, ExtraAction};
use crate::config::Config;
use crate::core::extras::ExtraLogic;
use crate::core::views::{extra_rows, total_to_invoice};
use crate::db::extras::{self, ExtraFilter};
use crate::db::job_sites;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::extra::{ExtraStatus, ExtraTarget};
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET, YELLOW};
use crate::utils::date::parse_date_or_today;
use crate::utils::formatting::format_amount;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Extra { action } = cmd {
        let mut pool = DbPool::open_initialized(&cfg.database)?;

        match action {
            ExtraAction::Add {
                site,
                client,
                description,
                amount,
                date,
                notes,
            } => {
                let target = ExtraTarget::resolve(*site, client.as_deref())?;
                let date = parse_date_or_today(date.as_deref())?;

                let extra = ExtraLogic::add(&mut pool, target, description, date, *amount, notes.as_deref())?;
                success(format!(
                    "Extra #{} recorded: {} ({}).",
                    extra.id,
                    extra.description,
                    format_amount(extra.amount)
                ));
            }

            ExtraAction::Invoice { id } => {
                let extra = ExtraLogic::mark_invoiced(&mut pool, *id)?;
                success(format!("Extra #{} marked as invoiced.", extra.id));
            }

            ExtraAction::List { status, site } => {
                let list = extras::list(
                    &pool.conn,
                    &ExtraFilter {
                        status: *status,
                        job_site_id: *site,
                        range: None,
                    },
                )?;

                if list.is_empty() {
                    info("No extras found.");
                    return Ok(());
                }

                let sites = job_sites::list_all(&pool.conn)?;
                let sep = cfg.separator_char.chars().next().unwrap_or('-');
                let mut table = Table::new(
                    &["ID", "Date", "Billed to", "Description", "Amount", "Status"],
                    sep,
                );

                for r in extra_rows(&list, &sites) {
                    let status = match r.extra.status {
                        ExtraStatus::ToInvoice => format!("{YELLOW}{}{RESET}", r.extra.status.label()),
                        ExtraStatus::Invoiced => format!("{GREY}{}{RESET}", r.extra.status.label()),
                    };
                    table.add_row(vec![
                        r.extra.id.to_string(),
                        r.extra.date_str(),
                        r.billed_to,
                        r.extra.description.clone(),
                        format_amount(r.extra.amount),
                        status,
                    ]);
                }

                print!("{}", table.render());
                println!("\nTotal to invoice: {}", format_amount(total_to_invoice(&list)));
            }

            ExtraAction::Del { id } => {
                ExtraLogic::delete(&mut pool, *id)?;
                success(format!("Extra #{} deleted.", id));
            }
        }
    }

    Ok(())
}
