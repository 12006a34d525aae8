use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportRequest};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        format,
        file,
        range,
        force,
    } = cmd
    {
        let pool = DbPool::open_initialized(&cfg.database)?;

        let request = ExportRequest {
            what: *what,
            format: *format,
            file: file.as_deref(),
            range: range.as_deref(),
            force: *force,
        };

        ExportLogic::export(&pool, cfg, &request)?;
    }
    Ok(())
}
