use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PracticeError, Result};
use crate::time_utils::{add_days, format_date, parse_date};

/// Daily hours credited for a retreat day that was sat.
pub const SAT_HOURS_PER_DAY: f64 = 12.0;

/// Daily hours credited for a retreat day that was served.
pub const SERVED_HOURS_PER_DAY: f64 = 4.0;

/// Coordinates are quantized to this many units per degree (~1 m) before
/// being compared as a location identity.
pub const COORD_SCALE: f64 = 100_000.0;

// ── RetreatKind ───────────────────────────────────────────────────────────────

/// How a retreat was attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RetreatKind {
    /// Formal sitting as a student.
    Sat,
    /// Support role (kitchen, management, ...).
    Served,
}

impl RetreatKind {
    /// Practice hours credited per retreat day of this kind.
    pub fn daily_hours(self) -> f64 {
        match self {
            RetreatKind::Sat => SAT_HOURS_PER_DAY,
            RetreatKind::Served => SERVED_HOURS_PER_DAY,
        }
    }

    /// Canonical table spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            RetreatKind::Sat => "Sat",
            RetreatKind::Served => "Served",
        }
    }
}

impl fmt::Display for RetreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetreatKind {
    type Err = PracticeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Sat" => Ok(RetreatKind::Sat),
            "Served" => Ok(RetreatKind::Served),
            other => Err(PracticeError::InvalidRecord {
                line: 0,
                reason: format!("unknown retreat kind \"{}\"", other),
            }),
        }
    }
}

// ── PracticePhase ─────────────────────────────────────────────────────────────

/// End of a practice phase: a fixed date, or "through the reference date".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PhaseEnd {
    Date(NaiveDate),
    Ongoing,
}

impl PhaseEnd {
    /// Spelling of [`PhaseEnd::Ongoing`] in configuration files.
    pub const ONGOING: &'static str = "ongoing";

    /// Concrete last day of the phase given the caller's reference date.
    pub fn resolve(self, reference_date: NaiveDate) -> NaiveDate {
        match self {
            PhaseEnd::Date(d) => d,
            PhaseEnd::Ongoing => reference_date,
        }
    }
}

impl TryFrom<String> for PhaseEnd {
    type Error = PracticeError;

    fn try_from(value: String) -> Result<Self> {
        if value.trim().eq_ignore_ascii_case(Self::ONGOING) {
            Ok(PhaseEnd::Ongoing)
        } else {
            parse_date(&value).map(PhaseEnd::Date)
        }
    }
}

impl From<PhaseEnd> for String {
    fn from(end: PhaseEnd) -> Self {
        match end {
            PhaseEnd::Date(d) => format_date(d),
            PhaseEnd::Ongoing => PhaseEnd::ONGOING.to_string(),
        }
    }
}

/// A contiguous date interval practised at a constant daily rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticePhase {
    /// First day of the phase (inclusive).
    pub start: NaiveDate,
    /// Last day of the phase (inclusive).
    pub end: PhaseEnd,
    /// Hours practised on every day of the phase.
    pub hours_per_day: f64,
}

impl PracticePhase {
    pub fn new(start: NaiveDate, end: PhaseEnd, hours_per_day: f64) -> Self {
        Self {
            start,
            end,
            hours_per_day,
        }
    }

    /// Check the phase and return its resolved (inclusive) last day.
    pub fn validate(&self, reference_date: NaiveDate) -> Result<NaiveDate> {
        let end = self.end.resolve(reference_date);
        if self.start > end {
            return Err(PracticeError::InvertedPhase {
                start: self.start,
                end,
            });
        }
        if !self.hours_per_day.is_finite() || self.hours_per_day < 0.0 {
            return Err(PracticeError::NegativeHours {
                date: self.start,
                hours: self.hours_per_day,
            });
        }
        Ok(end)
    }
}

// ── RetreatEvent ──────────────────────────────────────────────────────────────

/// A discrete multi-day retreat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetreatEvent {
    pub name: String,
    /// Arrival day, the first practice day.
    pub start: NaiveDate,
    /// Number of practice days.
    #[serde(rename = "days")]
    pub duration_days: u32,
    pub lat: f64,
    pub lon: f64,
    pub kind: RetreatKind,
}

impl RetreatEvent {
    /// Departure day: `start + duration_days`, not itself a practice day.
    pub fn end(&self) -> NaiveDate {
        add_days(self.start, self.duration_days)
    }

    /// Quantized coordinate identifying where the retreat took place.
    pub fn location_key(&self) -> LocationKey {
        LocationKey::from_coords(self.lat, self.lon)
    }

    /// At least one day, with the departure day still on the calendar.
    pub fn validate(&self) -> Result<()> {
        let departs = self
            .start
            .checked_add_days(Days::new(u64::from(self.duration_days)));
        if self.duration_days < 1 || departs.is_none() {
            return Err(PracticeError::InvalidDuration {
                name: self.name.clone(),
                start: self.start,
                days: i64::from(self.duration_days),
            });
        }
        Ok(())
    }
}

// ── Daily records ─────────────────────────────────────────────────────────────

/// Which stream a daily record was expanded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Practice,
    Retreat,
}

/// Hours practised on one calendar day, tagged with their origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub hours: f64,
    pub source: Source,
    /// Set for retreat records only.
    pub kind: Option<RetreatKind>,
}

impl DailyRecord {
    pub fn practice(date: NaiveDate, hours: f64) -> Self {
        Self {
            date,
            hours,
            source: Source::Practice,
            kind: None,
        }
    }

    pub fn retreat(date: NaiveDate, kind: RetreatKind) -> Self {
        Self {
            date,
            hours: kind.daily_hours(),
            source: Source::Retreat,
            kind: Some(kind),
        }
    }
}

/// One merged day: all streams summed, one entry per date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub hours: f64,
}

// ── Monthly series ────────────────────────────────────────────────────────────

/// Practice totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// First day of the month.
    pub month_start: NaiveDate,
    pub total_hours: f64,
    /// Running sum of `total_hours` up to and including this month.
    pub cumulative_hours: f64,
    /// Mean of the trailing window, absent until the window is full.
    pub trailing_average: Option<f64>,
}

/// Retreat hours for one (month, kind) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetreatMonthRow {
    pub month_start: NaiveDate,
    pub kind: RetreatKind,
    pub hours: f64,
    /// Number of retreat days contributing to `hours`.
    pub days: u32,
}

// ── Locations ─────────────────────────────────────────────────────────────────

/// Coordinate quantized to [`COORD_SCALE`] units per degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationKey {
    pub lat_units: i64,
    pub lon_units: i64,
}

impl LocationKey {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self {
            lat_units: (lat * COORD_SCALE).round() as i64,
            lon_units: (lon * COORD_SCALE).round() as i64,
        }
    }
}

/// Retreat statistics for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub lat: f64,
    pub lon: f64,
    pub center_label: String,
    pub total_days: u64,
    pub retreat_count: u32,
    /// `"{name}: {count} {kind}"` lines, sorted lexicographically.
    pub breakdown: Vec<String>,
}

impl LocationSummary {
    /// Breakdown lines joined with newlines.
    pub fn breakdown_text(&self) -> String {
        self.breakdown.join("\n")
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Headline figures for a whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_hours: f64,
    pub practice_hours: f64,
    pub retreat_hours: f64,
    pub retreat_count: usize,
    pub retreat_days: u64,
    pub first_month: Option<NaiveDate>,
    pub last_month: Option<NaiveDate>,
    /// `None` when the first and last month coincide.
    pub average_hours_per_year: Option<f64>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
