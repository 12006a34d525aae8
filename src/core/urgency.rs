//! Urgency classification: how overdue a service is on a job site.
//!
//! Mowing and weeding compare the days elapsed since the last completed visit
//! against a green/orange threshold pair. Trimming instead tracks a quota of
//! two visits per calendar year and only falls back to the elapsed-days test
//! while exactly one visit has been made this year.

use crate::models::intervention::Intervention;
use crate::models::intervention_type::InterventionType;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Trimming visits expected per calendar year.
pub const TRIM_TARGET_PER_YEAR: u32 = 2;

/// Ordered from least to most urgent, so `max()` yields the worst state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Green,
    Orange,
    Red,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Green => "ok",
            Urgency::Orange => "soon",
            Urgency::Red => "overdue",
        }
    }
}

/// Day limits: `elapsed <= green_max` is green, `<= orange_max` is orange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub green_max: i64,
    pub orange_max: i64,
}

impl UrgencyThresholds {
    pub const fn new(green_max: i64, orange_max: i64) -> Self {
        Self {
            green_max,
            orange_max,
        }
    }
}

/// Days between `last` and `today`; a visit dated in the future counts as today.
pub fn days_since(last: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    last.map(|d| (today - d).num_days().max(0))
}

/// Three-way elapsed-days test. Never done is the most urgent case.
pub fn classify_elapsed(elapsed: Option<i64>, thresholds: UrgencyThresholds) -> Urgency {
    match elapsed {
        None => Urgency::Red,
        Some(e) if e <= thresholds.green_max => Urgency::Green,
        Some(e) if e <= thresholds.orange_max => Urgency::Orange,
        Some(_) => Urgency::Red,
    }
}

/// Trimming quota test.
pub fn classify_trim(
    count_this_year: u32,
    elapsed_since_single: Option<i64>,
    thresholds: UrgencyThresholds,
) -> Urgency {
    match count_this_year {
        0 => Urgency::Red,
        1 => classify_elapsed(elapsed_since_single, thresholds),
        _ => Urgency::Green,
    }
}

/// What the classifier needs to know about one service on one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceHistory {
    pub last_date: Option<NaiveDate>,
    pub count_this_year: u32,
    /// Latest visit dated in the current year; later-year visits are ignored.
    pub last_this_year: Option<NaiveDate>,
}

impl ServiceHistory {
    /// Summarise the completed interventions of `kind` (in-progress ones do not count).
    pub fn from_interventions(
        interventions: &[Intervention],
        kind: InterventionType,
        today: NaiveDate,
    ) -> Self {
        interventions
            .iter()
            .filter(|i| i.kind == kind && i.is_completed())
            .fold(ServiceHistory::default(), |mut acc, i| {
                if i.date.year() == today.year() {
                    acc.count_this_year += 1;
                    acc.last_this_year = acc.last_this_year.max(Some(i.date));
                }
                acc.last_date = acc.last_date.max(Some(i.date));
                acc
            })
    }

    pub fn days_since_last(&self, today: NaiveDate) -> Option<i64> {
        days_since(self.last_date, today)
    }
}

/// Classify one service given its history and thresholds.
pub fn classify_service(
    kind: InterventionType,
    history: &ServiceHistory,
    thresholds: UrgencyThresholds,
    today: NaiveDate,
) -> Urgency {
    match kind {
        InterventionType::Mow | InterventionType::Weed => {
            classify_elapsed(history.days_since_last(today), thresholds)
        }
        InterventionType::Trim => {
            let elapsed = days_since(history.last_this_year, today);
            classify_trim(history.count_this_year, elapsed, thresholds)
        }
    }
}
