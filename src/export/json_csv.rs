// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::ExportRecord;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export JSON pretty-printed.
pub(crate) fn export_json<T: ExportRecord>(items: &[T], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(items)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// Export CSV with an explicit header row, so an empty export still has one.
pub(crate) fn export_csv<T: ExportRecord>(items: &[T], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    let csv_err = |e: csv::Error| AppError::Export(format!("CSV write error: {e}"));

    wtr.write_record(T::headers()).map_err(csv_err)?;
    for item in items {
        wtr.write_record(item.to_row()).map_err(csv_err)?;
    }

    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}
