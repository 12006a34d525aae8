use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::{BackupLogic, BackupSources};
use crate::errors::AppResult;
use crate::ui::messages::{confirm, info, success, warning};
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Restore { file, yes } = cmd {
        let sources = BackupSources::from_config(cfg);

        if !*yes {
            warning(format!(
                "Restoring replaces {} and everything in {}.",
                sources.database.display(),
                sources.attachments_dir.display()
            ));
            if !confirm("Continue?")? {
                info("Restore cancelled.");
                return Ok(());
            }
        }

        let report = BackupLogic::restore(&sources, Path::new(file))?;

        success(format!(
            "Restored from {}: {} database file(s), {} attachment(s){}",
            file,
            report.database_files,
            report.attachments,
            if report.config { ", configuration" } else { "" }
        ));
    }

    Ok(())
}
