use chrono::{DateTime, Local, TimeZone};
use rchantier::core::timer::{Clock, TimerService, TimerState};
use rchantier::db::interventions;
use rchantier::db::pool::DbPool;
use rchantier::errors::AppError;
use rchantier::models::client_type::ClientType;
use rchantier::models::intervention::InterventionStatus;
use rchantier::models::intervention_type::InterventionType;
use rchantier::models::job_site::JobSite;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::time::timeout;

mod common;
use common::temp_pool;

/// Clock that only moves when told to.
struct ManualClock {
    now: std::sync::Mutex<DateTime<Local>>,
}

impl ManualClock {
    fn at(h: u32, m: u32, s: u32) -> Arc<Self> {
        let start = Local.with_ymd_and_hms(2025, 6, 2, h, m, s).unwrap();
        Arc::new(Self {
            now: std::sync::Mutex::new(start),
        })
    }

    fn advance(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

struct Fixture {
    _dir: TempDir,
    store: Arc<Mutex<DbPool>>,
    clock: Arc<ManualClock>,
    service: TimerService,
    site_id: i64,
}

fn fixture() -> Fixture {
    let (dir, pool) = temp_pool();
    let site = JobSite::new("Martin", ClientType::Residential, "3 impasse des Lilas");
    let site_id = rchantier::db::job_sites::insert(&pool.conn, &site).unwrap();

    let store = Arc::new(Mutex::new(pool));
    let clock = ManualClock::at(8, 0, 0);
    let service = TimerService::new(Arc::clone(&store), clock.clone())
        .with_tick_period(Duration::from_millis(20));

    Fixture {
        _dir: dir,
        store,
        clock,
        service,
        site_id,
    }
}

async fn in_progress_count(store: &Mutex<DbPool>) -> usize {
    let pool = store.lock().await;
    interventions::list_in_progress(&pool.conn).unwrap().len()
}

#[tokio::test]
async fn start_creates_one_in_progress_visit() {
    let f = fixture();

    let state = f.service.start(f.site_id, InterventionType::Mow).await.unwrap();
    let TimerState::Running(run) = state else {
        panic!("timer should be running");
    };

    assert_eq!(run.job_site_id, f.site_id);
    assert_eq!(run.elapsed, "00:00:00");
    assert_eq!(in_progress_count(&f.store).await, 1);

    let pool = f.store.lock().await;
    let iv = interventions::get(&pool.conn, run.intervention_id).unwrap();
    assert_eq!(iv.status, InterventionStatus::InProgress);
    assert_eq!(iv.started_at, Some(f.clock.now()));
}

#[tokio::test]
async fn second_start_is_a_no_op() {
    let f = fixture();

    let first = f.service.start(f.site_id, InterventionType::Mow).await.unwrap();
    let second = f.service.start(f.site_id, InterventionType::Trim).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(in_progress_count(&f.store).await, 1);
    f.service.shutdown().await;
}

#[tokio::test]
async fn stop_when_idle_changes_nothing() {
    let f = fixture();

    assert!(f.service.stop(Some("rien")).await.unwrap().is_none());
    assert_eq!(f.service.state(), TimerState::Idle);

    let pool = f.store.lock().await;
    assert!(interventions::list_all(&pool.conn).unwrap().is_empty());
}

#[tokio::test]
async fn ticks_publish_the_elapsed_time() {
    let f = fixture();
    let mut rx = f.service.subscribe();

    f.service.start(f.site_id, InterventionType::Weed).await.unwrap();
    f.clock.advance(65);

    let seen = timeout(Duration::from_secs(2), async {
        loop {
            rx.changed().await.unwrap();
            if let TimerState::Running(run) = &*rx.borrow_and_update()
                && run.elapsed == "00:01:05"
            {
                return run.elapsed.clone();
            }
        }
    })
    .await
    .expect("a tick within two seconds");

    assert_eq!(seen, "00:01:05");
    f.service.shutdown().await;
}

#[tokio::test]
async fn stop_completes_the_visit_and_goes_idle() {
    let f = fixture();

    f.service.start(f.site_id, InterventionType::Trim).await.unwrap();
    f.clock.advance(45 * 60);

    let iv = f
        .service
        .stop(Some("  haie taillée  "))
        .await
        .unwrap()
        .expect("a completed visit");

    assert_eq!(iv.status, InterventionStatus::Completed);
    assert_eq!(iv.duration_minutes, Some(45));
    assert_eq!(iv.notes, "haie taillée");
    assert_eq!(f.service.state(), TimerState::Idle);
    assert_eq!(in_progress_count(&f.store).await, 0);

    // A new run can start once idle.
    let again = f.service.start(f.site_id, InterventionType::Mow).await.unwrap();
    assert!(again.is_running());
    f.service.shutdown().await;
}

#[tokio::test]
async fn unknown_site_leaves_the_timer_idle() {
    let f = fixture();

    let err = f.service.start(9999, InterventionType::Mow).await;
    assert!(matches!(err, Err(AppError::NotFound { .. })));
    assert!(!f.service.state().is_running());
    assert_eq!(in_progress_count(&f.store).await, 0);
}
