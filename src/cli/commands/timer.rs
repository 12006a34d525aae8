use crate::cli::parser::{Commands, TimerAction};
use crate::config::Config;
use crate::core::timer::{SystemClock, TimerService, TimerState};
use crate::db::pool::DbPool;
use crate::db::{interventions, job_sites};
use crate::errors::{AppError, AppResult};
use crate::models::intervention_type::InterventionType;
use crate::ui::messages::{info, success, warning};
use crate::utils::mins2readable;
use crate::utils::time::format_elapsed;
use chrono::Local;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Timer { action } = cmd {
        match action {
            TimerAction::Start { site, kind } => run_foreground(cfg, *site, *kind)?,
            TimerAction::Status => status(cfg)?,
        }
    }

    Ok(())
}

/// Read one line on a blocking thread; EOF and errors count as "stop".
async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

fn run_foreground(cfg: &Config, site_id: i64, kind: InterventionType) -> AppResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let pool = DbPool::open_initialized(&cfg.database)?;
        let site = job_sites::get(&pool.conn, site_id)?;

        let service = TimerService::new(Arc::new(Mutex::new(pool)), Arc::new(SystemClock));
        let mut rx = service.subscribe();

        let TimerState::Running(run) = service.start(site_id, kind).await? else {
            return Err(AppError::Timer("timer did not start".into()));
        };

        info(format!(
            "{} on '{}' started at {} (visit #{}). Press Enter to stop.",
            kind.label(),
            site.client_name,
            run.started_at.format("%H:%M"),
            run.intervention_id
        ));

        let printer = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let line = match &*rx.borrow_and_update() {
                    TimerState::Running(r) => format!("\r⏱  {}  ", r.elapsed),
                    TimerState::Idle => break,
                };
                print!("{line}");
                let _ = io::stdout().flush();
            }
        });

        let interrupted = tokio::select! {
            _ = read_line() => false,
            _ = tokio::signal::ctrl_c() => true,
        };
        printer.abort();
        println!();

        // After Ctrl-C stdin may still be held by the pending read.
        let notes = if interrupted {
            None
        } else {
            print!("Notes (optional): ");
            let _ = io::stdout().flush();
            read_line().await.filter(|n| !n.is_empty())
        };

        let stopped = service.stop(notes.as_deref()).await?;
        Ok::<_, AppError>(stopped)
    });

    // A stdin read may still be blocked; do not wait for it.
    runtime.shutdown_background();

    match result? {
        Some(iv) => success(format!(
            "Visit #{} completed: {} ({}).",
            iv.id,
            iv.time_range(),
            mins2readable(iv.duration_minutes.unwrap_or(0))
        )),
        None => warning("Timer was not running."),
    }

    Ok(())
}

fn status(cfg: &Config) -> AppResult<()> {
    let pool = DbPool::open_initialized(&cfg.database)?;
    let running = interventions::list_in_progress(&pool.conn)?;

    if running.is_empty() {
        info("No visit in progress.");
        return Ok(());
    }

    let now = Local::now();
    for iv in running {
        let client = job_sites::find(&pool.conn, iv.job_site_id)?
            .map(|s| s.client_name)
            .unwrap_or_default();
        let elapsed = iv
            .started_at
            .map(|s| format_elapsed(now - s))
            .unwrap_or_else(|| "--:--:--".into());

        warning(format!(
            "Visit #{} {} on '{}' in progress since {} ({}). Finish it with `rchantier visit finish {}`.",
            iv.id,
            iv.kind.label(),
            client,
            iv.time_range(),
            elapsed,
            iv.id
        ));
    }

    Ok(())
}
