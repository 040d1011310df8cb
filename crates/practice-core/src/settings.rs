use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::time_utils::parse_date;

/// Name of the per-user data directory under `$HOME`.
pub const DATA_DIR_NAME: &str = ".practice-history";

/// File names inside the data directory.
pub const CONFIG_FILE: &str = "history.json";
pub const DAILY_LOG_FILE: &str = "daily_log.csv";
pub const RETREATS_FILE: &str = "retreats.csv";
pub const MONTHLY_FILE: &str = "monthly.csv";
pub const RETREAT_MONTHLY_FILE: &str = "retreat_monthly.csv";
pub const LOCATIONS_FILE: &str = "locations.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Long-term meditation practice history
#[derive(Parser, Debug, Clone)]
#[command(
    name = "practice-history",
    about = "Expand a meditation practice history into daily, monthly and per-location tables",
    version
)]
pub struct Settings {
    /// Directory holding the daily log and retreats tables
    #[arg(long, global = true, env = "PRACTICE_HISTORY_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path (defaults to stderr)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write daily_log.csv and retreats.csv from a history configuration
    Convert(ConvertArgs),
    /// Aggregate the tables into monthly and per-location reports
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// History configuration (defaults to <data-dir>/history.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference date closing "ongoing" phases (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// History configuration supplying center names and the window
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Trailing-average window in months (1-120)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub window: Option<u32>,

    /// Directory for the derived tables (defaults to the data dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve derived values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but with an explicit argument list, so tests
    /// need not spawn a subprocess.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        Self::resolve(Settings::parse_from(args))
    }

    /// Fallible variant used where a usage error must not exit the process.
    pub fn try_load_from_args(args: Vec<OsString>) -> Result<Self, clap::Error> {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Data directory, falling back to `~/.practice-history`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Explicit `--config` of the active subcommand, else `<data-dir>/history.json`.
    pub fn config_path(&self) -> PathBuf {
        let explicit = match &self.command {
            Command::Convert(args) => args.config.as_ref(),
            Command::Report(args) => args.config.as_ref(),
        };
        explicit
            .cloned()
            .unwrap_or_else(|| self.data_dir().join(CONFIG_FILE))
    }
}

/// `~/.practice-history`, or `./.practice-history` without a home directory.
pub fn default_data_dir() -> PathBuf {
    default_data_dir_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// Data directory rooted at `base_dir` (used for testing).
pub fn default_data_dir_in(base_dir: &Path) -> PathBuf {
    base_dir.join(DATA_DIR_NAME)
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
