use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the attachments folder
///  - the SQLite database with all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    println!("⚙️  Initializing rChantier…");

    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    audit_quiet(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    );

    println!("📁 Attachments : {}", cfg.attachments_dir);
    success(format!("Database initialized at {}", &cfg.database));
    Ok(())
}
