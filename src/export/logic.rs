// src/export/logic.rs

use crate::config::Config;
use crate::core::views::{SiteListQuery, build_site_rows, extra_rows};
use crate::db::extras::ExtraFilter;
use crate::db::interventions::InterventionFilter;
use crate::db::pool::DbPool;
use crate::db::{extras, interventions, job_sites, weedings};
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{ExportKind, ExportRecord, ExtraExport, SiteExport, VisitExport};
use crate::export::pdf_export::export_pdf;
use crate::export::range::parse_range;
use crate::export::xlsx::export_xlsx;
use crate::export::ExportFormat;
use crate::ui::messages::{info, warning};
use crate::utils::date::today;
use crate::utils::path::resolve_in;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct ExportRequest<'a> {
    pub what: ExportKind,
    pub format: ExportFormat,
    /// Output file; relative paths resolve against the working directory.
    pub file: Option<&'a str>,
    /// `None` or `"all"` exports everything; see [`parse_range`] for the syntax.
    pub range: Option<&'a str>,
    pub force: bool,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Write the requested report. Returns the file written, or `None` when
    /// there was nothing to export.
    pub fn export(pool: &DbPool, cfg: &Config, req: &ExportRequest<'_>) -> AppResult<Option<PathBuf>> {
        let bounds: Option<(NaiveDate, NaiveDate)> = match req.range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        let path = match req.file {
            Some(f) => resolve_in(&std::env::current_dir()?, f),
            None => default_output_path(cfg, req.what, req.format, today()),
        };

        let title = build_title(req.what, bounds);

        let written = match req.what {
            ExportKind::Sites => {
                if bounds.is_some() {
                    warning("--range does not apply to sites; exporting all of them.");
                }
                let items = load_sites(pool, cfg)?;
                write(&items, &path, req, &title, "Sites")?
            }
            ExportKind::Visits => {
                let items = load_visits(pool, bounds)?;
                write(&items, &path, req, &title, "Visits")?
            }
            ExportKind::Extras => {
                let items = load_extras(pool, bounds)?;
                write(&items, &path, req, &title, "Extras")?
            }
        };

        Ok(written.then_some(path))
    }
}

/// PDF reports land in the attachments folder so backups carry them.
pub fn default_output_path(cfg: &Config, what: ExportKind, format: ExportFormat, on: NaiveDate) -> PathBuf {
    let name = format!("{}-{}.{}", what.as_str(), on.format("%Y%m%d"), format.as_str());

    match format {
        ExportFormat::Pdf => Path::new(&cfg.attachments_dir).join(name),
        _ => PathBuf::from(name),
    }
}

fn write<T: ExportRecord>(
    items: &[T],
    path: &Path,
    req: &ExportRequest<'_>,
    title: &str,
    sheet: &str,
) -> AppResult<bool> {
    if items.is_empty() {
        warning(format!("No {} found for the selected range.", req.what.as_str()));
        return Ok(false);
    }

    ensure_writable(path, req.force)?;
    info(format!("{} {} to export.", items.len(), req.what.as_str()));

    match req.format {
        ExportFormat::Csv => export_csv(items, path)?,
        ExportFormat::Json => export_json(items, path)?,
        ExportFormat::Xlsx => export_xlsx(items, path, sheet)?,
        ExportFormat::Pdf => export_pdf(items, path, title)?,
    }

    Ok(true)
}

fn build_title(what: ExportKind, bounds: Option<(NaiveDate, NaiveDate)>) -> String {
    let subject = match what {
        ExportKind::Sites => "Job sites",
        ExportKind::Visits => "Interventions",
        ExportKind::Extras => "Extras",
    };

    match bounds {
        None => subject.to_string(),
        Some((from, to)) if from == to => format!("{} on {}", subject, from.format("%Y-%m-%d")),
        Some((from, to)) => format!(
            "{} from {} to {}",
            subject,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        ),
    }
}

fn load_sites(pool: &DbPool, cfg: &Config) -> AppResult<Vec<SiteExport>> {
    let sites = job_sites::list_all(&pool.conn)?;
    let ivs = interventions::list_all(&pool.conn)?;
    let plans = weedings::list(&pool.conn, true)?;

    let rows = build_site_rows(
        &sites,
        &ivs,
        &plans,
        &cfg.thresholds,
        today(),
        &SiteListQuery::default(),
    );

    Ok(rows.iter().map(SiteExport::from).collect())
}

fn load_visits(pool: &DbPool, bounds: Option<(NaiveDate, NaiveDate)>) -> AppResult<Vec<VisitExport>> {
    let names: HashMap<i64, String> = job_sites::list_all(&pool.conn)?
        .into_iter()
        .map(|s| (s.id, s.client_name))
        .collect();

    let mut ivs = interventions::list(
        &pool.conn,
        &InterventionFilter {
            range: bounds,
            ..Default::default()
        },
    )?;
    ivs.reverse();

    Ok(ivs
        .iter()
        .map(|iv| {
            let client = names.get(&iv.job_site_id).map(String::as_str).unwrap_or("");
            VisitExport::new(iv, client)
        })
        .collect())
}

fn load_extras(pool: &DbPool, bounds: Option<(NaiveDate, NaiveDate)>) -> AppResult<Vec<ExtraExport>> {
    let sites = job_sites::list_all(&pool.conn)?;
    let list = extras::list(
        &pool.conn,
        &ExtraFilter {
            range: bounds,
            ..Default::default()
        },
    )?;

    Ok(extra_rows(&list, &sites).iter().map(ExtraExport::from).collect())
}
