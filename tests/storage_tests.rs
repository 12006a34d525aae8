use chrono::NaiveTime;
use rchantier::core::extras::ExtraLogic;
use rchantier::core::geocode::Geocoder;
use rchantier::core::interventions::VisitLogic;
use rchantier::core::sites::{NewSite, Placement, SiteChanges, SiteLogic};
use rchantier::core::weedings::WeedingLogic;
use rchantier::db::initialize::init_db;
use rchantier::db::interventions::{self, InterventionFilter};
use rchantier::db::pool::DbPool;
use rchantier::db::{extras, job_sites, weedings};
use rchantier::errors::{AppError, AppResult};
use rchantier::models::client_type::ClientType;
use rchantier::models::coordinates::Coordinates;
use rchantier::models::extra::{ExtraStatus, ExtraTarget};
use rchantier::models::intervention::InterventionStatus;
use rchantier::models::intervention_type::InterventionType;
use std::cell::Cell;

mod common;
use common::{date, temp_pool};

fn new_site(pool: &mut DbPool, name: &str) -> i64 {
    SiteLogic::add(
        pool,
        NewSite {
            client_name: name.into(),
            client_type: ClientType::Residential,
            address: "12 chemin des Vignes".into(),
            services: None,
            notes: None,
        },
        Placement::Skip,
    )
    .expect("add site")
    .id
}

/// Returns a fixed answer and counts the lookups.
struct FixedGeocoder {
    answer: Option<Coordinates>,
    calls: Cell<u32>,
}

impl Geocoder for FixedGeocoder {
    fn geocode(&self, _address: &str) -> AppResult<Option<Coordinates>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.answer)
    }
}

struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    fn geocode(&self, _address: &str) -> AppResult<Option<Coordinates>> {
        Err(AppError::Geocoding("offline".into()))
    }
}

#[test]
fn deleting_a_site_cascades_visits_and_plans_but_keeps_extras() {
    let (_dir, mut pool) = temp_pool();
    let id = new_site(&mut pool, "Martin");
    let other = new_site(&mut pool, "Dupont");

    VisitLogic::add(&mut pool, id, InterventionType::Mow, date("2025-05-01"), None, None, None)
        .unwrap();
    VisitLogic::add(&mut pool, other, InterventionType::Mow, date("2025-05-01"), None, None, None)
        .unwrap();
    WeedingLogic::plan(&mut pool, id, date("2025-07-01"), None).unwrap();
    let extra = ExtraLogic::add(
        &mut pool,
        ExtraTarget::Site(id),
        "Évacuation de déchets verts",
        date("2025-05-02"),
        90.0,
        None,
    )
    .unwrap();

    let report = SiteLogic::delete(&mut pool, id).unwrap();
    assert_eq!(report.interventions, 1);
    assert_eq!(report.planned_weedings, 1);
    assert_eq!(report.extras_detached, 1);

    assert!(job_sites::find(&pool.conn, id).unwrap().is_none());
    assert!(interventions::list_for_site(&pool.conn, id).unwrap().is_empty());
    assert!(weedings::list_for_site(&pool.conn, id).unwrap().is_empty());
    assert_eq!(interventions::list_for_site(&pool.conn, other).unwrap().len(), 1);

    let kept = extras::get(&pool.conn, extra.id).unwrap();
    assert_eq!(kept.job_site_id, None);
    assert_eq!(kept.amount, 90.0);
}

#[test]
fn marking_a_weeding_done_logs_a_weed_visit() {
    let (_dir, mut pool) = temp_pool();
    let id = new_site(&mut pool, "Martin");

    let plan = WeedingLogic::plan(&mut pool, id, date("2025-06-01"), Some("allées")).unwrap();
    let iv = WeedingLogic::mark_done(&mut pool, plan.id, date("2025-06-03")).unwrap();

    assert_eq!(iv.kind, InterventionType::Weed);
    assert_eq!(iv.date, date("2025-06-03"));
    assert_eq!(iv.notes, "allées");
    assert!(weedings::get(&pool.conn, plan.id).unwrap().done);

    let again = WeedingLogic::mark_done(&mut pool, plan.id, date("2025-06-04"));
    assert!(matches!(again, Err(AppError::Validation(_))));
    assert_eq!(interventions::list_for_site(&pool.conn, id).unwrap().len(), 1);
}

#[test]
fn visit_times_are_validated() {
    let (_dir, mut pool) = temp_pool();
    let id = new_site(&mut pool, "Martin");
    let t = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").ok();

    let iv = VisitLogic::add(
        &mut pool,
        id,
        InterventionType::Trim,
        date("2025-05-10"),
        t("08:00"),
        t("10:30"),
        Some("haie côté rue"),
    )
    .unwrap();
    assert_eq!(iv.duration_minutes, Some(150));
    assert_eq!(iv.status, InterventionStatus::Completed);

    let backwards = VisitLogic::add(
        &mut pool,
        id,
        InterventionType::Trim,
        date("2025-05-10"),
        t("10:00"),
        t("09:00"),
        None,
    );
    assert!(matches!(backwards, Err(AppError::InvalidTime(_))));

    let out_only = VisitLogic::add(
        &mut pool,
        id,
        InterventionType::Trim,
        date("2025-05-10"),
        None,
        t("09:00"),
        None,
    );
    assert!(matches!(out_only, Err(AppError::InvalidTime(_))));

    let missing = VisitLogic::add(&mut pool, 999, InterventionType::Mow, date("2025-05-10"), None, None, None);
    assert!(matches!(missing, Err(AppError::NotFound { .. })));
}

#[test]
fn visit_filters_combine() {
    let (_dir, mut pool) = temp_pool();
    let a = new_site(&mut pool, "Martin");
    let b = new_site(&mut pool, "Dupont");

    for (site, kind, on) in [
        (a, InterventionType::Mow, "2025-04-01"),
        (a, InterventionType::Mow, "2025-05-01"),
        (a, InterventionType::Trim, "2025-05-15"),
        (b, InterventionType::Mow, "2025-05-20"),
    ] {
        VisitLogic::add(&mut pool, site, kind, date(on), None, None, None).unwrap();
    }

    let may_mowing = interventions::list(
        &pool.conn,
        &InterventionFilter {
            kind: Some(InterventionType::Mow),
            range: Some((date("2025-05-01"), date("2025-05-31"))),
            ..Default::default()
        },
    )
    .unwrap();

    let dates: Vec<_> = may_mowing.iter().map(|i| i.date_str()).collect();
    assert_eq!(dates, vec!["2025-05-20", "2025-05-01"]);
}

#[test]
fn extras_need_exactly_one_reference_and_a_valid_amount() {
    let (_dir, mut pool) = temp_pool();

    assert!(ExtraTarget::resolve(None, None).is_err());
    assert!(ExtraTarget::resolve(Some(1), Some("Voisin")).is_err());
    assert_eq!(
        ExtraTarget::resolve(None, Some("  Voisin ")).unwrap(),
        ExtraTarget::Client("Voisin".into())
    );

    let negative = ExtraLogic::add(
        &mut pool,
        ExtraTarget::Client("Voisin".into()),
        "Débroussaillage",
        date("2025-05-01"),
        -5.0,
        None,
    );
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let e = ExtraLogic::add(
        &mut pool,
        ExtraTarget::Client("Voisin".into()),
        "Débroussaillage",
        date("2025-05-01"),
        75.0,
        None,
    )
    .unwrap();

    let invoiced = ExtraLogic::mark_invoiced(&mut pool, e.id).unwrap();
    assert_eq!(invoiced.status, ExtraStatus::Invoiced);
    assert!(ExtraLogic::mark_invoiced(&mut pool, e.id).is_err());
}

#[test]
fn geocoding_runs_on_add_and_on_address_change_only() {
    let (_dir, mut pool) = temp_pool();
    let geo = FixedGeocoder {
        answer: Coordinates::new(45.764, 4.8357),
        calls: Cell::new(0),
    };

    let site = SiteLogic::add(
        &mut pool,
        NewSite {
            client_name: "Martin".into(),
            client_type: ClientType::Professional,
            address: "1 place Bellecour, Lyon".into(),
            services: Some(vec![InterventionType::Mow, InterventionType::Weed]),
            notes: None,
        },
        Placement::Geocode(&geo),
    )
    .unwrap();
    assert_eq!(geo.calls.get(), 1);
    assert_eq!(site.coordinates(), Coordinates::new(45.764, 4.8357));
    assert!(!site.is_active(InterventionType::Trim));

    let renamed = SiteLogic::edit(
        &mut pool,
        site.id,
        SiteChanges {
            client_name: Some("Martin SARL".into()),
            ..Default::default()
        },
        Placement::Geocode(&geo),
    )
    .unwrap();
    assert_eq!(geo.calls.get(), 1);
    assert_eq!(renamed.client_name, "Martin SARL");

    SiteLogic::edit(
        &mut pool,
        site.id,
        SiteChanges {
            address: Some("2 quai Saint-Antoine, Lyon".into()),
            ..Default::default()
        },
        Placement::Geocode(&geo),
    )
    .unwrap();
    assert_eq!(geo.calls.get(), 2);
}

#[test]
fn failed_geocoding_still_saves_the_site() {
    let (_dir, mut pool) = temp_pool();

    let site = SiteLogic::add(
        &mut pool,
        NewSite {
            client_name: "Martin".into(),
            client_type: ClientType::Residential,
            address: "nulle part".into(),
            services: None,
            notes: None,
        },
        Placement::Geocode(&FailingGeocoder),
    )
    .unwrap();

    let stored = job_sites::get(&pool.conn, site.id).unwrap();
    assert_eq!(stored.coordinates(), None);
    assert_eq!(stored.client_name, "Martin");
}

#[test]
fn migrations_are_idempotent() {
    let (_dir, pool) = temp_pool();

    init_db(&pool.conn).unwrap();
    init_db(&pool.conn).unwrap();

    let applied: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(applied, 2);
}

#[test]
fn mutations_are_audited() {
    let (_dir, mut pool) = temp_pool();
    let id = new_site(&mut pool, "Martin");
    VisitLogic::add(&mut pool, id, InterventionType::Mow, date("2025-05-01"), None, None, None)
        .unwrap();

    let ops: Vec<String> = pool
        .conn
        .prepare("SELECT operation FROM log WHERE operation != 'migration_applied' ORDER BY id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(ops, vec!["site_add", "visit_add"]);
}
