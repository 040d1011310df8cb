//! Main aggregation pipeline.
//!
//! Runs every stage over an explicit input structure and returns all derived
//! tables plus the headline [`HistorySummary`], ready for the report writer.

use chrono::NaiveDate;
use practice_core::config::{CenterLookup, HistoryConfig, DEFAULT_WINDOW_MONTHS};
use practice_core::models::{
    DailyRecord, DailyTotal, HistorySummary, LocationSummary, MonthlyBucket, RetreatEvent,
    RetreatMonthRow,
};
use practice_core::Result;
use tracing::{debug, info};

use crate::aggregator::{MonthlyAggregator, RetreatMonthlyAggregator};
use crate::expander::{PhaseExpander, RetreatExpander};
use crate::location::LocationAggregator;
use crate::merger::DailyMerger;

// ── Public types ──────────────────────────────────────────────────────────────

/// Raw inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    /// Practice stream: one record per date, e.g. the loaded daily log.
    pub practice: Vec<DailyRecord>,
    /// Original retreat events.
    pub retreats: Vec<RetreatEvent>,
}

/// Tunables of one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Trailing-average window in months.
    pub window: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW_MONTHS,
        }
    }
}

/// Every table derived from a [`PipelineInput`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Merged daily totals, one per date.
    pub daily: Vec<DailyTotal>,
    /// Gap-free monthly series.
    pub monthly: Vec<MonthlyBucket>,
    /// Retreat hours per (month, kind).
    pub retreat_monthly: Vec<RetreatMonthRow>,
    /// Per-location retreat summaries.
    pub locations: Vec<LocationSummary>,
    pub summary: HistorySummary,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Build the pipeline input from a history configuration by expanding its
/// phases; ongoing phases end on `reference_date`.
pub fn input_from_config(config: &HistoryConfig, reference_date: NaiveDate) -> Result<PipelineInput> {
    Ok(PipelineInput {
        practice: PhaseExpander::expand(&config.phases, reference_date)?,
        retreats: config.retreats.clone(),
    })
}

/// Run the full pipeline.
///
/// 1. Expand retreats into daily records.
/// 2. Drop practice days covered by a retreat day.
/// 3. Merge both streams into daily totals.
/// 4. Aggregate monthly totals and retreat (month, kind) rows.
/// 5. Summarise retreats per location.
/// 6. Compute the headline summary.
pub fn run_pipeline(
    input: &PipelineInput,
    options: &PipelineOptions,
    centers: &dyn CenterLookup,
) -> Result<PipelineOutput> {
    // ── Step 1: Expand retreats ───────────────────────────────────────────────
    let retreat_days = RetreatExpander::expand(&input.retreats)?;

    // ── Step 2: Displace practice on retreat days ─────────────────────────────
    let practice = DailyMerger::displace_retreat_days(&input.practice, &retreat_days);

    // ── Step 3: Merge ─────────────────────────────────────────────────────────
    let daily = DailyMerger::merge(&practice, &retreat_days);

    // ── Step 4: Monthly series ────────────────────────────────────────────────
    let monthly = MonthlyAggregator::aggregate(&daily, options.window)?;
    let retreat_monthly = RetreatMonthlyAggregator::aggregate(&retreat_days);

    // ── Step 5: Locations ─────────────────────────────────────────────────────
    let locations = LocationAggregator::aggregate(&input.retreats, centers);

    // ── Step 6: Summary ───────────────────────────────────────────────────────
    let summary = HistorySummary {
        total_hours: MonthlyAggregator::total_hours(&monthly),
        practice_hours: practice.iter().map(|r| r.hours).sum(),
        retreat_hours: retreat_days.iter().map(|r| r.hours).sum(),
        retreat_count: input.retreats.len(),
        retreat_days: input
            .retreats
            .iter()
            .map(|r| u64::from(r.duration_days))
            .sum(),
        first_month: monthly.first().map(|b| b.month_start),
        last_month: monthly.last().map(|b| b.month_start),
        average_hours_per_year: MonthlyAggregator::average_hours_per_year(&monthly),
    };

    debug!(
        "Pipeline produced {} days, {} months, {} retreat rows, {} locations",
        daily.len(),
        monthly.len(),
        retreat_monthly.len(),
        locations.len()
    );
    info!(
        "History: {:.1} hours over {} months, {} retreats",
        summary.total_hours,
        monthly.len(),
        summary.retreat_count
    );

    Ok(PipelineOutput {
        daily,
        monthly,
        retreat_monthly,
        locations,
        summary,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
