//! rChantier library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter (`debug`, `rchantier=trace`, ...).
pub const LOG_ENV: &str = "RCHANTIER_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Site { .. } => cli::commands::site::handle(&cli.command, cfg),
        Commands::Visit { .. } => cli::commands::visit::handle(&cli.command, cfg),
        Commands::Weeding { .. } => cli::commands::weeding::handle(&cli.command, cfg),
        Commands::Extra { .. } => cli::commands::extra::handle(&cli.command, cfg),
        Commands::Timer { .. } => cli::commands::timer::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Backup { .. } => cli::commands::backup::handle(&cli.command, cfg),
        Commands::Restore { .. } => cli::commands::restore::handle(&cli.command, cfg),
    }
}

/// Diagnostics go to stderr; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // try_init: a subscriber may already be installed when embedded.
    if std::env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();

    // `init` and `config` must work even when the config file no longer validates.
    let mut cfg = match &cli.command {
        Commands::Init => Config::load().unwrap_or_default(),
        Commands::Config { .. } => Config::load_unchecked().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable configuration, using defaults");
            Config::default()
        }),
        _ => Config::load()?,
    };

    // Same resolution as `init`: relative names live in the config dir.
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::resolve_in(&Config::config_dir(), custom_db)
            .to_string_lossy()
            .to_string();
    }

    tracing::debug!(database = %cfg.database, "configuration loaded");

    dispatch(&cli, &cfg)
}
