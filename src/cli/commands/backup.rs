use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::{BackupLogic, BackupSources};
use crate::errors::AppResult;
use crate::ui::messages::success;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup { file, force } = cmd {
        let sources = BackupSources::from_config(cfg);
        let report = BackupLogic::create(&sources, Path::new(file), *force)?;

        success(format!(
            "Backup created: {} ({} database file(s), {} attachment(s){})",
            file,
            report.database_files,
            report.attachments,
            if report.config { ", configuration" } else { "" }
        ));
    }

    Ok(())
}
