// src/export/pdf_export.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::{ExportRecord, to_table};
use crate::export::notify_export_success;
use crate::export::pdf::PdfManager;
use crate::ui::messages::info;
use crate::utils::date::today;
use std::path::Path;

/// Tables wider than this switch to a landscape page.
const PORTRAIT_MAX_COLUMNS: usize = 8;

pub(crate) fn export_pdf<T: ExportRecord>(items: &[T], path: &Path, title: &str) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let footer = format!("rchantier, {}", today().format("%Y-%m-%d"));
    let mut pdf = PdfManager::new().with_footer(&footer);
    if T::headers().len() > PORTRAIT_MAX_COLUMNS {
        pdf = pdf.landscape();
    }

    pdf.write_table(title, T::headers(), &to_table(items));

    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", path);
    Ok(())
}
