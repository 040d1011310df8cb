use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use practice_core::config::HistoryConfig;
use practice_core::formatting::{format_hours, format_number, format_optional, percentage};
use practice_core::settings::{
    ConvertArgs, ReportArgs, Settings, DAILY_LOG_FILE, LOCATIONS_FILE, MONTHLY_FILE,
    RETREATS_FILE, RETREAT_MONTHLY_FILE,
};
use practice_core::time_utils::format_month;
use practice_core::PracticeError;
use practice_data::analysis::{run_pipeline, PipelineInput, PipelineOptions, PipelineOutput};
use practice_data::expander::PhaseExpander;
use practice_data::reader::{load_daily_log, load_retreats};
use practice_data::writer::{
    write_daily_log, write_locations, write_monthly, write_retreat_monthly, write_retreats,
    write_table_file,
};
use tracing::{debug, info};

// ── convert ────────────────────────────────────────────────────────────────────

/// Expand the configured phases into `daily_log.csv` and write the retreat
/// list to `retreats.csv`, both inside the data directory.
///
/// `today` closes ongoing phases unless `--as-of` was given.
pub fn run_convert(settings: &Settings, args: &ConvertArgs, today: NaiveDate) -> Result<()> {
    let config_path = settings.config_path();
    let config = HistoryConfig::load_from(&config_path)
        .with_context(|| format!("cannot load history from {}", config_path.display()))?;

    let reference_date = args.as_of.unwrap_or(today);
    config
        .validate(reference_date)
        .context("history configuration is invalid")?;

    let daily = PhaseExpander::expand(&config.phases, reference_date)?;

    let data_dir = settings.data_dir();
    let daily_path = data_dir.join(DAILY_LOG_FILE);
    let retreats_path = data_dir.join(RETREATS_FILE);
    write_table_file(&daily_path, |out| write_daily_log(&daily, out))?;
    write_table_file(&retreats_path, |out| write_retreats(&config.retreats, out))?;

    info!(
        "{} created with {} rows; {} updated with {} retreats",
        daily_path.display(),
        daily.len(),
        retreats_path.display(),
        config.retreats.len()
    );
    Ok(())
}

// ── report ─────────────────────────────────────────────────────────────────────

/// Load both tables, run the pipeline, write the derived tables and print
/// the headline metrics.
pub fn run_report(settings: &Settings, args: &ReportArgs) -> Result<PipelineOutput> {
    let data_dir = settings.data_dir();
    let practice = load_daily_log(&data_dir.join(DAILY_LOG_FILE))
        .context("daily log unavailable; run `practice-history convert` first")?;
    let retreats = load_retreats(&data_dir.join(RETREATS_FILE))
        .context("retreats table unavailable; run `practice-history convert` first")?;

    let config = load_report_config(settings, args.config.is_some())?;
    let window = args
        .window
        .map(|w| w as usize)
        .unwrap_or_else(|| config.window());

    let output = run_pipeline(
        &PipelineInput {
            practice,
            retreats,
        },
        &PipelineOptions { window },
        &config.center_directory(),
    )?;

    let out_dir = args.out_dir.clone().unwrap_or(data_dir);
    write_report_tables(&output, &out_dir)?;

    println!("{}", render_summary(&output, window));
    Ok(output)
}

/// The configuration only supplies center names and the window here, so a
/// missing default file is tolerated; an explicit `--config` must exist.
fn load_report_config(settings: &Settings, explicit: bool) -> Result<HistoryConfig> {
    let path = settings.config_path();
    match HistoryConfig::load_from(&path) {
        Ok(config) => Ok(config),
        Err(PracticeError::SourceNotFound(_)) if !explicit => {
            debug!("No history config at {}; centers unnamed", path.display());
            Ok(HistoryConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("cannot load history from {}", path.display())),
    }
}

fn write_report_tables(output: &PipelineOutput, out_dir: &Path) -> Result<()> {
    write_table_file(&out_dir.join(MONTHLY_FILE), |out| {
        write_monthly(&output.monthly, out)
    })?;
    write_table_file(&out_dir.join(RETREAT_MONTHLY_FILE), |out| {
        write_retreat_monthly(&output.retreat_monthly, out)
    })?;
    write_table_file(&out_dir.join(LOCATIONS_FILE), |out| {
        write_locations(&output.locations, out)
    })?;
    info!("Report tables written to {}", out_dir.display());
    Ok(())
}

/// Plain-text headline block printed after a report.
pub fn render_summary(output: &PipelineOutput, window: usize) -> String {
    let summary = &output.summary;
    let span = match (summary.first_month, summary.last_month) {
        (Some(first), Some(last)) => format!("{} .. {}", format_month(first), format_month(last)),
        _ => "no records".to_string(),
    };
    let latest_trend = output
        .monthly
        .last()
        .and_then(|b| b.trailing_average);

    let mut lines = vec![
        format!("Period              {}", span),
        format!("Total life hours    {}", format_hours(summary.total_hours)),
        format!(
            "  retreat share     {}%",
            format_number(percentage(summary.retreat_hours, summary.total_hours, 1), 1)
        ),
        format!(
            "Total retreats      {} ({} days)",
            summary.retreat_count, summary.retreat_days
        ),
        format!(
            "Avg hours / year    {}",
            format_optional(summary.average_hours_per_year, 0)
        ),
        format!(
            "{}-month trend      {}",
            window,
            format_optional(latest_trend, 1)
        ),
    ];
    if !output.locations.is_empty() {
        lines.push("Locations".to_string());
        for loc in &output.locations {
            lines.push(format!(
                "  {:<24} {:>4} days  {} retreats",
                loc.center_label, loc.total_days, loc.retreat_count
            ));
        }
    }
    lines.join("\n")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
