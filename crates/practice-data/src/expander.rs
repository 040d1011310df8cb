//! Expansion of sparse phase / retreat descriptions into daily records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use practice_core::models::{DailyRecord, PracticePhase, RetreatEvent};
use practice_core::time_utils::{add_days, inclusive_days};
use practice_core::Result;
use tracing::debug;

// ── PhaseExpander ─────────────────────────────────────────────────────────────

/// Expands practice phases into one record per calendar day.
pub struct PhaseExpander;

impl PhaseExpander {
    /// One [`DailyRecord`] per day covered by any phase, sorted ascending.
    ///
    /// Each phase covers `[start, end]` inclusive; an ongoing phase ends on
    /// `reference_date`. Where phases overlap the day's hours are the sum of
    /// every contributing phase. All phases are validated before any output is
    /// produced.
    pub fn expand(phases: &[PracticePhase], reference_date: NaiveDate) -> Result<Vec<DailyRecord>> {
        let mut resolved = Vec::with_capacity(phases.len());
        for phase in phases {
            let end = phase.validate(reference_date)?;
            resolved.push((phase.start, end, phase.hours_per_day));
        }

        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (start, end, hours) in resolved {
            for day in inclusive_days(start, end) {
                *by_date.entry(day).or_insert(0.0) += hours;
            }
        }

        debug!(
            "Expanded {} phases into {} practice days",
            phases.len(),
            by_date.len()
        );

        Ok(by_date
            .into_iter()
            .map(|(date, hours)| DailyRecord::practice(date, hours))
            .collect())
    }
}

// ── RetreatExpander ───────────────────────────────────────────────────────────

/// Expands retreat events into one record per retreat day.
pub struct RetreatExpander;

impl RetreatExpander {
    /// `duration_days` records per event covering `[start, start + days)`.
    ///
    /// The departure day is not a practice day. Hours come from the retreat
    /// kind. Records are sorted by date; overlapping retreats yield repeated
    /// dates, which the merger later sums.
    pub fn expand(retreats: &[RetreatEvent]) -> Result<Vec<DailyRecord>> {
        for retreat in retreats {
            retreat.validate()?;
        }

        let mut records: Vec<DailyRecord> = retreats
            .iter()
            .flat_map(|r| {
                (0..r.duration_days).map(move |offset| {
                    DailyRecord::retreat(add_days(r.start, offset), r.kind)
                })
            })
            .collect();
        // Stable sort keeps input order among same-day records.
        records.sort_by_key(|r| r.date);

        debug!(
            "Expanded {} retreats into {} retreat days",
            retreats.len(),
            records.len()
        );

        Ok(records)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
