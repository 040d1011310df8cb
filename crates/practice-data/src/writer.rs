//! CSV output for the input tables and every derived table.

use std::io::Write;
use std::path::Path;

use practice_core::models::{
    DailyRecord, LocationSummary, MonthlyBucket, RetreatEvent, RetreatMonthRow,
};
use practice_core::time_utils::{format_date, format_month};
use practice_core::Result;
use tracing::debug;

// ── Input tables ──────────────────────────────────────────────────────────────

/// Write `Date,Hours` rows in the order given.
pub fn write_daily_log<W: Write>(records: &[DailyRecord], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Date", "Hours"])?;
    for record in records {
        writer.write_record([format_date(record.date), record.hours.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the retreats table; `End` is the departure day `Start + Days`.
pub fn write_retreats<W: Write>(retreats: &[RetreatEvent], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Name", "Start", "End", "Duration_Days", "Lat", "Lon", "Kind"])?;
    for r in retreats {
        writer.write_record([
            r.name.clone(),
            format_date(r.start),
            format_date(r.end()),
            r.duration_days.to_string(),
            r.lat.to_string(),
            r.lon.to_string(),
            r.kind.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// ── Derived tables ────────────────────────────────────────────────────────────

/// `Month,Hours,Cumulative_Hours,Trailing_Avg`; an absent average is left empty.
pub fn write_monthly<W: Write>(buckets: &[MonthlyBucket], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Month", "Hours", "Cumulative_Hours", "Trailing_Avg"])?;
    for b in buckets {
        writer.write_record([
            format_month(b.month_start),
            format!("{:.2}", b.total_hours),
            format!("{:.2}", b.cumulative_hours),
            b.trailing_average
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// `Month,Kind,Hours,Days`.
pub fn write_retreat_monthly<W: Write>(rows: &[RetreatMonthRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Month", "Kind", "Hours", "Days"])?;
    for row in rows {
        writer.write_record([
            format_month(row.month_start),
            row.kind.to_string(),
            format!("{:.2}", row.hours),
            row.days.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// `Center,Lat,Lon,Total_Days,Retreat_Count,Breakdown`; the breakdown cell
/// holds one line per (name, kind).
pub fn write_locations<W: Write>(summaries: &[LocationSummary], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "Center",
        "Lat",
        "Lon",
        "Total_Days",
        "Retreat_Count",
        "Breakdown",
    ])?;
    for s in summaries {
        writer.write_record([
            s.center_label.clone(),
            s.lat.to_string(),
            s.lon.to_string(),
            s.total_days.to_string(),
            s.retreat_count.to_string(),
            s.breakdown_text(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Render a table in memory with `render`, then write it to `path` through a
/// temporary file and rename, creating parent directories as needed.
pub fn write_table_file<F>(path: &Path, render: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut buffer = Vec::new();
    render(&mut buffer)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, &buffer)?;
    std::fs::rename(&tmp, path)?;

    debug!("Wrote {} bytes to {}", buffer.len(), path.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
