use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the practice-history crates.
#[derive(Error, Debug)]
pub enum PracticeError {
    /// A date string was not a valid ISO 8601 `YYYY-MM-DD` date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A practice phase ends before it starts.
    #[error("Phase starting {start} ends before it starts ({end})")]
    InvertedPhase { start: NaiveDate, end: NaiveDate },

    /// A practice phase or daily-log row carries negative (or non-finite) hours.
    #[error("Invalid hours {hours} on {date}")]
    NegativeHours { date: NaiveDate, hours: f64 },

    /// A retreat lasts less than one day.
    #[error("Retreat '{name}' starting {start} has invalid duration {days} days")]
    InvalidDuration {
        name: String,
        start: NaiveDate,
        days: i64,
    },

    /// A retreats-table row whose `End` and `Duration_Days` disagree.
    #[error("Retreat '{name}' starting {start} is inconsistent: {detail}")]
    InconsistentRetreat {
        name: String,
        start: NaiveDate,
        detail: String,
    },

    /// The trailing-average window must cover at least one month.
    #[error("Invalid trailing window: {0} months")]
    InvalidWindow(usize),

    /// A table row could not be interpreted.
    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    /// A required input table or configuration file does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV table could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the practice crates.
pub type Result<T> = std::result::Result<T, PracticeError>;
