//! Foreground stopwatch tied to one in-progress intervention.
//!
//! The service is a two-state machine (idle / running). Starting creates an
//! in-progress intervention and spawns a 1 Hz ticker that republishes the
//! formatted elapsed time on a `watch` channel; stopping cancels the ticker
//! and completes the intervention. Start and stop are serialized by an async
//! lock, and the store sits behind its own async mutex so every write goes
//! through one place.
//!
//! Timer state is not persisted: if the process dies, the in-progress
//! intervention is all that remains.

use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{interventions, job_sites};
use crate::errors::AppResult;
use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use crate::utils::time::format_elapsed;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Wall-clock source, swappable in tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunningTimer {
    pub intervention_id: i64,
    pub job_site_id: i64,
    pub kind: InterventionType,
    pub started_at: DateTime<Local>,
    /// `HH:MM:SS` since `started_at`, refreshed on every tick.
    pub elapsed: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(RunningTimer),
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running(_))
    }
}

pub struct TimerService {
    store: Arc<Mutex<DbPool>>,
    clock: Arc<dyn Clock>,
    state: Arc<watch::Sender<TimerState>>,
    /// Cancellation handle of the live ticker; the lock also serializes start/stop.
    ticker: Mutex<Option<CancellationToken>>,
    tick_period: Duration,
}

impl TimerService {
    pub fn new(store: Arc<Mutex<DbPool>>, clock: Arc<dyn Clock>) -> Self {
        let (tx, _rx) = watch::channel(TimerState::Idle);
        Self {
            store,
            clock,
            state: Arc::new(tx),
            ticker: Mutex::new(None),
            tick_period: TICK_PERIOD,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TimerState {
        self.state.borrow().clone()
    }

    /// Start timing `kind` on a site. While already running this is a no-op
    /// that returns the current state.
    pub async fn start(&self, job_site_id: i64, kind: InterventionType) -> AppResult<TimerState> {
        let mut ticker = self.ticker.lock().await;

        let current = self.state();
        if let TimerState::Running(run) = &current {
            warn!(
                intervention_id = run.intervention_id,
                job_site_id = run.job_site_id,
                "timer already running, start ignored"
            );
            return Ok(current);
        }

        let started_at = self.clock.now();

        let intervention_id = {
            let pool = self.store.lock().await;
            let site = job_sites::get(&pool.conn, job_site_id)?;

            let iv = Intervention::in_progress(job_site_id, kind, started_at);
            let id = interventions::insert(&pool.conn, &iv)?;

            audit_quiet(
                &pool.conn,
                "timer_start",
                &format!("visit #{}", id),
                &format!("{} started on '{}'", kind.label(), site.client_name),
            );
            id
        };

        let running = RunningTimer {
            intervention_id,
            job_site_id,
            kind,
            started_at,
            elapsed: format_elapsed(chrono::Duration::zero()),
        };
        self.state.send_replace(TimerState::Running(running.clone()));

        let token = CancellationToken::new();
        tokio::spawn(run_ticker(
            Arc::clone(&self.state),
            Arc::clone(&self.clock),
            intervention_id,
            started_at,
            self.tick_period,
            token.clone(),
        ));
        *ticker = Some(token);

        info!(intervention_id, job_site_id, kind = kind.to_db_str(), "timer started");

        Ok(TimerState::Running(running))
    }

    /// Stop the running timer and complete its intervention. Returns `None`
    /// (and changes nothing) when idle.
    pub async fn stop(&self, notes: Option<&str>) -> AppResult<Option<Intervention>> {
        let mut ticker = self.ticker.lock().await;

        let TimerState::Running(run) = self.state() else {
            debug!("timer idle, stop ignored");
            return Ok(None);
        };

        if let Some(token) = ticker.take() {
            token.cancel();
        }

        let ended_at = self.clock.now();

        let completed = {
            let pool = self.store.lock().await;
            complete_record(&pool, run.intervention_id, ended_at, notes)
        };

        // Idle even when the write failed: the record stays in progress and
        // can be finished by hand.
        self.state.send_replace(TimerState::Idle);

        let iv = completed?;
        info!(
            intervention_id = iv.id,
            minutes = iv.duration_minutes.unwrap_or(0),
            "timer stopped"
        );

        Ok(Some(iv))
    }

    /// Cancel the ticker without touching the stored record.
    pub async fn shutdown(&self) {
        if let Some(token) = self.ticker.lock().await.take() {
            token.cancel();
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        if let Some(token) = self.ticker.get_mut().take() {
            token.cancel();
        }
    }
}

fn complete_record(
    pool: &DbPool,
    id: i64,
    ended_at: DateTime<Local>,
    notes: Option<&str>,
) -> AppResult<Intervention> {
    let mut iv = interventions::get(&pool.conn, id)?;
    iv.complete(ended_at, notes);
    interventions::update(&pool.conn, &iv)?;

    audit_quiet(
        &pool.conn,
        "timer_stop",
        &format!("visit #{}", id),
        &format!(
            "{} completed after {} min",
            iv.kind.label(),
            iv.duration_minutes.unwrap_or(0)
        ),
    );

    Ok(iv)
}

async fn run_ticker(
    state: Arc<watch::Sender<TimerState>>,
    clock: Arc<dyn Clock>,
    intervention_id: i64,
    started_at: DateTime<Local>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(intervention_id, "ticker cancelled");
                break;
            }
            _ = ticker.tick() => {
                let elapsed = format_elapsed(clock.now() - started_at);

                state.send_if_modified(|s| match s {
                    TimerState::Running(run)
                        if run.intervention_id == intervention_id && run.elapsed != elapsed =>
                    {
                        run.elapsed = elapsed;
                        true
                    }
                    _ => false,
                });
            }
        }
    }
}
