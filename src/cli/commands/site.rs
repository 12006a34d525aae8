use crate::cli::parser::{Commands, PlacementArgs, SiteAction};
use crate::config::Config;
use crate::core::geocode::{Geocoder, NominatimGeocoder};
use crate::core::sites::{NewSite, Placement, SiteChanges, SiteLogic};
use crate::core::urgency::TRIM_TARGET_PER_YEAR;
use crate::core::views::{ServiceStatus, SiteListQuery, SiteRow, build_site_rows, extra_rows, site_row};
use crate::db::extras::ExtraFilter;
use crate::db::pool::DbPool;
use crate::db::{extras, interventions, job_sites, weedings};
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::Coordinates;
use crate::models::intervention_type::InterventionType;
use crate::ui::messages::{confirm, header, info, label, success, warning};
use crate::utils::colors::{GREY, RESET, colorize_optional, colorize_urgency};
use crate::utils::date::{relative_days, today};
use crate::utils::formatting::{format_amount, or_dash};
use crate::utils::table::Table;

const RECENT_VISITS: usize = 10;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Site { action } = cmd {
        let mut pool = DbPool::open_initialized(&cfg.database)?;

        match action {
            SiteAction::Add {
                client,
                address,
                client_type,
                services,
                placement,
                notes,
            } => {
                let geocoder = NominatimGeocoder::from_config(&cfg.geocoding);
                let placement = placement_from(placement, cfg, &geocoder)?;

                let site = SiteLogic::add(
                    &mut pool,
                    NewSite {
                        client_name: client.clone(),
                        client_type: *client_type,
                        address: address.clone(),
                        services: services.clone(),
                        notes: notes.clone(),
                    },
                    placement,
                )?;

                success(format!(
                    "Job site #{} added: {} ({})",
                    site.id,
                    site.client_name,
                    site.coordinates()
                        .map(|c| c.display())
                        .unwrap_or_else(|| "no coordinates".into())
                ));
            }

            SiteAction::Edit {
                id,
                client,
                address,
                client_type,
                services,
                placement,
                notes,
            } => {
                let geocoder = NominatimGeocoder::from_config(&cfg.geocoding);
                let placement = placement_from(placement, cfg, &geocoder)?;

                let changes = SiteChanges {
                    client_name: client.clone(),
                    client_type: *client_type,
                    address: address.clone(),
                    services: services.clone(),
                    notes: notes.clone(),
                };

                let site = SiteLogic::edit(&mut pool, *id, changes, placement)?;
                success(format!("Job site #{} updated.", site.id));
            }

            SiteAction::Show { id } => show(&pool, cfg, *id)?,

            SiteAction::List {
                search,
                sort,
                service,
                urgent,
            } => {
                let query = SiteListQuery {
                    search: search.clone(),
                    sort: *sort,
                    service: *service,
                    urgent_only: *urgent,
                };
                list(&pool, cfg, &query)?;
            }

            SiteAction::Del { id, yes } => {
                let site = job_sites::get(&pool.conn, *id)?;

                if !*yes
                    && !confirm(&format!(
                        "Delete '{}' with all its visits and planned weedings?",
                        site.client_name
                    ))?
                {
                    info("Nothing deleted.");
                    return Ok(());
                }

                let report = SiteLogic::delete(&mut pool, *id)?;
                success(format!(
                    "Job site #{} deleted ({} visit(s), {} plan(s) removed; {} extra(s) kept).",
                    id, report.interventions, report.planned_weedings, report.extras_detached
                ));
            }
        }
    }

    Ok(())
}

fn placement_from<'a>(
    args: &PlacementArgs,
    cfg: &Config,
    geocoder: &'a dyn Geocoder,
) -> AppResult<Placement<'a>> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let c = Coordinates::new(lat, lon).ok_or_else(|| {
            AppError::Validation(format!("coordinates out of range: {lat}, {lon}"))
        })?;
        return Ok(Placement::Manual(c));
    }

    if args.no_geocode || !cfg.geocoding.enabled {
        Ok(Placement::Skip)
    } else {
        Ok(Placement::Geocode(geocoder))
    }
}

/// Table cell for one service: elapsed days (plus the yearly count for
/// trimming), coloured by urgency.
fn service_cell(status: Option<&ServiceStatus>, dark_mode: bool) -> String {
    let Some(s) = status else {
        return colorize_optional("--");
    };

    let mut text = match s.days_since {
        Some(d) => format!("{d} d"),
        None => "never".to_string(),
    };
    if s.kind == InterventionType::Trim {
        text.push_str(&format!(" ({}/{})", s.count_this_year, TRIM_TARGET_PER_YEAR));
    }

    colorize_urgency(s.urgency, &text, dark_mode)
}

fn list(pool: &DbPool, cfg: &Config, query: &SiteListQuery) -> AppResult<()> {
    let sites = job_sites::list_all(&pool.conn)?;
    let ivs = interventions::list_all(&pool.conn)?;
    let plans = weedings::list(&pool.conn, true)?;
    let today = today();

    let rows = build_site_rows(&sites, &ivs, &plans, &cfg.thresholds, today, query);

    if rows.is_empty() {
        info("No job sites match.");
        return Ok(());
    }

    let sep = cfg.separator_char.chars().next().unwrap_or('-');
    let mut table = Table::new(
        &["ID", "Client", "Type", "Mow", "Trim", "Weed", "Last visit", "Next weeding"],
        sep,
    );

    for r in &rows {
        table.add_row(render_row(r, cfg.dark_mode, today));
    }

    print!("{}", table.render());
    println!("\n{} site(s)", rows.len());
    Ok(())
}

fn render_row(r: &SiteRow, dark_mode: bool, today: chrono::NaiveDate) -> Vec<String> {
    let date_or_dash = |d: Option<chrono::NaiveDate>| {
        colorize_optional(&or_dash(d.map(|d| d.format("%Y-%m-%d").to_string())))
    };

    let next_weeding = match r.next_weeding {
        Some(d) if d < today => format!("{} ({})", d.format("%Y-%m-%d"), relative_days(d, today)),
        other => date_or_dash(other),
    };

    vec![
        r.site.id.to_string(),
        r.site.client_name.clone(),
        r.site.client_type.code().to_string(),
        service_cell(r.status(InterventionType::Mow), dark_mode),
        service_cell(r.status(InterventionType::Trim), dark_mode),
        service_cell(r.status(InterventionType::Weed), dark_mode),
        date_or_dash(r.last_visit),
        next_weeding,
    ]
}

fn show(pool: &DbPool, cfg: &Config, id: i64) -> AppResult<()> {
    let site = job_sites::get(&pool.conn, id)?;
    let ivs = interventions::list_for_site(&pool.conn, id)?;
    let plans = weedings::list_for_site(&pool.conn, id)?;
    let today = today();

    let row = site_row(&site, &ivs, &plans, &cfg.thresholds, today);

    header(format!("#{} {}", site.id, site.client_name));
    label("Type", site.client_type.label());
    label("Address", &site.address);
    label(
        "Coordinates",
        site.coordinates()
            .map(|c| c.display())
            .unwrap_or_else(|| format!("{GREY}--{RESET}")),
    );
    label("Services", site.services_label());
    if !site.notes.is_empty() {
        label("Notes", &site.notes);
    }

    println!();
    for kind in InterventionType::ALL {
        let status = row.status(kind);
        let when = status
            .and_then(|s| s.last_date)
            .map(|d| format!("last {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "  {:<8} {}  {}",
            kind.label(),
            service_cell(status, cfg.dark_mode),
            when
        );
    }

    println!();
    if ivs.is_empty() {
        info("No visits recorded yet.");
    } else {
        let sep = cfg.separator_char.chars().next().unwrap_or('-');
        let mut table = Table::new(&["ID", "Date", "Type", "Time", "Status", "Notes"], sep);
        for iv in ivs.iter().take(RECENT_VISITS) {
            table.add_row(vec![
                iv.id.to_string(),
                iv.date_str(),
                iv.kind.label().to_string(),
                iv.time_range(),
                iv.status.to_db_str().to_string(),
                iv.notes.clone(),
            ]);
        }
        print!("{}", table.render());
    }

    let pending: Vec<_> = plans.iter().filter(|p| !p.done).collect();
    if !pending.is_empty() {
        println!();
        for p in pending {
            let line = format!(
                "Weeding planned {} ({})",
                p.planned_date.format("%Y-%m-%d"),
                relative_days(p.planned_date, today)
            );
            if p.is_late(today) {
                warning(line);
            } else {
                info(line);
            }
        }
    }

    let site_extras = extras::list(
        &pool.conn,
        &ExtraFilter {
            job_site_id: Some(id),
            ..Default::default()
        },
    )?;
    if !site_extras.is_empty() {
        println!();
        for e in extra_rows(&site_extras, std::slice::from_ref(&site)) {
            println!(
                "  extra #{} {} {} {} [{}]",
                e.extra.id,
                e.extra.date_str(),
                e.extra.description,
                format_amount(e.extra.amount),
                e.extra.status.label()
            );
        }
    }

    Ok(())
}
