//! Monthly aggregation of daily records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use practice_core::models::{DailyRecord, DailyTotal, MonthlyBucket, RetreatKind, RetreatMonthRow};
use practice_core::time_utils::{elapsed_years, month_start, month_starts_between};
use practice_core::{PracticeError, Result};
use tracing::{debug, warn};

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Rolls merged daily totals up into a gap-free monthly series.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Bucket `daily` by calendar month and derive the running statistics.
    ///
    /// Every month from the first to the last record is present; months with
    /// no records get a zero total so the trailing window always spans
    /// `window` consecutive calendar months. `trailing_average` is `None` for
    /// the first `window - 1` buckets.
    pub fn aggregate(daily: &[DailyTotal], window: usize) -> Result<Vec<MonthlyBucket>> {
        if window == 0 {
            return Err(PracticeError::InvalidWindow(window));
        }

        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for day in daily {
            *totals.entry(month_start(day.date)).or_insert(0.0) += day.hours;
        }

        let (Some(first), Some(last)) = (
            totals.keys().next().copied(),
            totals.keys().next_back().copied(),
        ) else {
            return Ok(Vec::new());
        };

        let months = month_starts_between(first, last);
        let filled = months.len() - totals.len();
        if filled > 0 {
            debug!("Filled {} empty months with zero-hour buckets", filled);
        }

        let month_totals: Vec<f64> = months
            .iter()
            .map(|m| totals.get(m).copied().unwrap_or(0.0))
            .collect();

        let mut cumulative = 0.0;
        let buckets = months
            .into_iter()
            .enumerate()
            .map(|(i, month)| {
                let total_hours = month_totals[i];
                cumulative += total_hours;
                MonthlyBucket {
                    month_start: month,
                    total_hours,
                    cumulative_hours: cumulative,
                    trailing_average: trailing_mean(&month_totals, i, window),
                }
            })
            .collect();

        Ok(buckets)
    }

    /// Sum of all monthly totals.
    pub fn total_hours(buckets: &[MonthlyBucket]) -> f64 {
        buckets.iter().map(|b| b.total_hours).sum()
    }

    /// Total hours divided by the years elapsed between the first and last
    /// bucket's month start.
    ///
    /// Returns `None` for an empty or single-month series, where no time has
    /// elapsed.
    pub fn average_hours_per_year(buckets: &[MonthlyBucket]) -> Option<f64> {
        let first = buckets.first()?.month_start;
        let last = buckets.last()?.month_start;
        let Some(years) = elapsed_years(first, last) else {
            debug!("Single-month history; average per year is undefined");
            return None;
        };
        Some(Self::total_hours(buckets) / years)
    }
}

/// Mean of `values[i + 1 - window..=i]`, or `None` before the window fills.
fn trailing_mean(values: &[f64], i: usize, window: usize) -> Option<f64> {
    if i + 1 < window {
        return None;
    }
    let slice = &values[i + 1 - window..=i];
    Some(slice.iter().sum::<f64>() / window as f64)
}

// ── RetreatMonthlyAggregator ──────────────────────────────────────────────────

/// Groups retreat days by (month, kind) for the sat-versus-served view.
pub struct RetreatMonthlyAggregator;

impl RetreatMonthlyAggregator {
    /// One row per (month, kind) with at least one retreat day, sorted by
    /// month then kind.
    ///
    /// Expects the unmerged retreat stream; records without a kind are skipped.
    pub fn aggregate(retreat_records: &[DailyRecord]) -> Vec<RetreatMonthRow> {
        let mut groups: BTreeMap<(NaiveDate, RetreatKind), (f64, u32)> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in retreat_records {
            let Some(kind) = record.kind else {
                skipped += 1;
                continue;
            };
            let entry = groups
                .entry((month_start(record.date), kind))
                .or_insert((0.0, 0));
            entry.0 += record.hours;
            entry.1 += 1;
        }

        if skipped > 0 {
            warn!("Skipped {} daily records without a retreat kind", skipped);
        }

        groups
            .into_iter()
            .map(|((month_start, kind), (hours, days))| RetreatMonthRow {
                month_start,
                kind,
                hours,
                days,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
