use chrono::{Local, TimeZone};
use rchantier::core::urgency::{
    ServiceHistory, Urgency, UrgencyThresholds, classify_elapsed, classify_service, classify_trim,
    days_since,
};
use rchantier::models::intervention::Intervention;
use rchantier::models::intervention_type::InterventionType;

mod common;
use common::{date, visit};

const MOW: UrgencyThresholds = UrgencyThresholds::new(15, 21);

#[test]
fn elapsed_days_fall_into_three_bands() {
    assert_eq!(classify_elapsed(Some(0), MOW), Urgency::Green);
    assert_eq!(classify_elapsed(Some(15), MOW), Urgency::Green);
    assert_eq!(classify_elapsed(Some(16), MOW), Urgency::Orange);
    assert_eq!(classify_elapsed(Some(18), MOW), Urgency::Orange);
    assert_eq!(classify_elapsed(Some(21), MOW), Urgency::Orange);
    assert_eq!(classify_elapsed(Some(22), MOW), Urgency::Red);
    assert_eq!(classify_elapsed(None, MOW), Urgency::Red);
}

#[test]
fn band_edges_hold_for_any_valid_pair() {
    for g in 0..30 {
        for o in (g + 1)..40 {
            let t = UrgencyThresholds::new(g, o);
            for e in 0..50 {
                let expected = if e <= g {
                    Urgency::Green
                } else if e <= o {
                    Urgency::Orange
                } else {
                    Urgency::Red
                };
                assert_eq!(classify_elapsed(Some(e), t), expected, "e={e} g={g} o={o}");
            }
        }
    }
}

#[test]
fn trim_quota_overrides_dates() {
    let t = UrgencyThresholds::new(120, 180);

    assert_eq!(classify_trim(0, Some(1), t), Urgency::Red);
    assert_eq!(classify_trim(0, None, t), Urgency::Red);
    assert_eq!(classify_trim(2, Some(400), t), Urgency::Green);
    assert_eq!(classify_trim(3, None, t), Urgency::Green);

    assert_eq!(classify_trim(1, Some(100), t), Urgency::Green);
    assert_eq!(classify_trim(1, Some(150), t), Urgency::Orange);
    assert_eq!(classify_trim(1, Some(181), t), Urgency::Red);
}

#[test]
fn future_visits_count_as_today() {
    let today = date("2025-06-10");
    assert_eq!(days_since(Some(date("2025-06-20")), today), Some(0));
    assert_eq!(days_since(Some(date("2025-06-01")), today), Some(9));
    assert_eq!(days_since(None, today), None);
}

#[test]
fn history_ignores_in_progress_and_other_kinds() {
    let today = date("2025-06-10");
    let started = Local.with_ymd_and_hms(2025, 6, 9, 8, 0, 0).unwrap();

    let ivs = vec![
        visit(1, 1, InterventionType::Mow, "2025-05-01"),
        visit(2, 1, InterventionType::Mow, "2025-05-20"),
        visit(3, 1, InterventionType::Trim, "2025-06-01"),
        Intervention::in_progress(1, InterventionType::Mow, started),
    ];

    let mow = ServiceHistory::from_interventions(&ivs, InterventionType::Mow, today);
    assert_eq!(mow.last_date, Some(date("2025-05-20")));
    assert_eq!(mow.count_this_year, 2);
    assert_eq!(mow.days_since_last(today), Some(21));
    assert_eq!(
        classify_service(InterventionType::Mow, &mow, MOW, today),
        Urgency::Orange
    );
}

#[test]
fn trim_counts_only_the_current_year() {
    let today = date("2025-03-01");
    let t = UrgencyThresholds::new(120, 180);

    let last_year = vec![
        visit(1, 1, InterventionType::Trim, "2024-05-01"),
        visit(2, 1, InterventionType::Trim, "2024-09-01"),
    ];
    let h = ServiceHistory::from_interventions(&last_year, InterventionType::Trim, today);
    assert_eq!(h.count_this_year, 0);
    assert_eq!(classify_service(InterventionType::Trim, &h, t, today), Urgency::Red);

    let one_this_year = vec![
        visit(1, 1, InterventionType::Trim, "2024-09-01"),
        visit(2, 1, InterventionType::Trim, "2025-01-05"),
    ];
    let h = ServiceHistory::from_interventions(&one_this_year, InterventionType::Trim, today);
    assert_eq!(h.count_this_year, 1);
    assert_eq!(classify_service(InterventionType::Trim, &h, t, today), Urgency::Green);

    let late = date("2025-06-15");
    let h = ServiceHistory::from_interventions(&one_this_year, InterventionType::Trim, late);
    assert_eq!(classify_service(InterventionType::Trim, &h, t, late), Urgency::Orange);
}

#[test]
fn single_trim_this_year_ignores_visits_dated_later() {
    let today = date("2026-10-19");
    let t = UrgencyThresholds::new(120, 180);

    let ivs = vec![
        visit(1, 1, InterventionType::Trim, "2026-08-01"),
        visit(2, 1, InterventionType::Trim, "2027-01-10"),
    ];
    let h = ServiceHistory::from_interventions(&ivs, InterventionType::Trim, today);

    assert_eq!(h.count_this_year, 1);
    assert_eq!(h.last_date, Some(date("2027-01-10")));
    assert_eq!(h.last_this_year, Some(date("2026-08-01")));
    assert_eq!(classify_service(InterventionType::Trim, &h, t, today), Urgency::Green);
}

#[test]
fn worst_urgency_is_the_maximum() {
    let all = [Urgency::Orange, Urgency::Green, Urgency::Red];
    assert_eq!(all.iter().max(), Some(&Urgency::Red));
    assert!(Urgency::Green < Urgency::Orange);
}
