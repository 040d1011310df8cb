//! Merging of the practice and retreat daily streams.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use practice_core::models::{DailyRecord, DailyTotal};
use tracing::debug;

/// Unifies independently expanded daily streams.
pub struct DailyMerger;

impl DailyMerger {
    /// One [`DailyTotal`] per date appearing in either stream, sorted
    /// ascending; each date's hours are the sum of every input record on it.
    pub fn merge(practice: &[DailyRecord], retreats: &[DailyRecord]) -> Vec<DailyTotal> {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in practice.iter().chain(retreats) {
            *by_date.entry(record.date).or_insert(0.0) += record.hours;
        }

        debug!(
            "Merged {} practice and {} retreat records into {} days",
            practice.len(),
            retreats.len(),
            by_date.len()
        );

        by_date
            .into_iter()
            .map(|(date, hours)| DailyTotal { date, hours })
            .collect()
    }

    /// Practice records whose date is not covered by any retreat record.
    ///
    /// A retreat day replaces the home practice rate for that day.
    pub fn displace_retreat_days(
        practice: &[DailyRecord],
        retreats: &[DailyRecord],
    ) -> Vec<DailyRecord> {
        let retreat_days: HashSet<NaiveDate> = retreats.iter().map(|r| r.date).collect();
        let kept: Vec<DailyRecord> = practice
            .iter()
            .filter(|r| !retreat_days.contains(&r.date))
            .cloned()
            .collect();

        debug!(
            "Displaced {} practice days covered by retreats",
            practice.len() - kept.len()
        );
        kept
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
