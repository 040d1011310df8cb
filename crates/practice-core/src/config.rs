//! History configuration: the hand-authored phases, retreats and retreat
//! centers every run is computed from.
//!
//! Loaded from a JSON document such as:
//!
//! ```json
//! {
//!   "phases": [
//!     { "start": "2009-07-01", "end": "2012-03-01", "hours_per_day": 0.25 },
//!     { "start": "2024-01-01", "end": "ongoing", "hours_per_day": 2.0 }
//!   ],
//!   "retreats": [
//!     { "name": "10-day", "start": "2009-07-01", "days": 10,
//!       "lat": 51.9371, "lon": -2.7183, "kind": "Sat" }
//!   ],
//!   "centers": [
//!     { "name": "Dhamma Dipa", "lat": 51.9371, "lon": -2.7183 }
//!   ],
//!   "window_months": 6
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PracticeError, Result};
use crate::models::{LocationKey, PracticePhase, RetreatEvent};

/// Default trailing-average window, in months.
pub const DEFAULT_WINDOW_MONTHS: usize = 6;

// ── HistoryConfig ─────────────────────────────────────────────────────────────

/// All raw inputs of a practice history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub phases: Vec<PracticePhase>,
    #[serde(default)]
    pub retreats: Vec<RetreatEvent>,
    #[serde(default)]
    pub centers: Vec<RetreatCenter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_months: Option<usize>,
}

impl HistoryConfig {
    /// Load a configuration from `path`.
    ///
    /// A missing file is reported as [`PracticeError::SourceNotFound`].
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PracticeError::SourceNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| PracticeError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HistoryConfig = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} phases, {} retreats, {} centers from {}",
            config.phases.len(),
            config.retreats.len(),
            config.centers.len(),
            path.display()
        );
        Ok(config)
    }

    /// Check every phase and retreat up front so a bad entry aborts the run
    /// before anything is written.
    pub fn validate(&self, reference_date: NaiveDate) -> Result<()> {
        for phase in &self.phases {
            phase.validate(reference_date)?;
        }
        for retreat in &self.retreats {
            retreat.validate()?;
        }
        if let Some(window) = self.window_months {
            if window == 0 {
                return Err(PracticeError::InvalidWindow(window));
            }
        }
        Ok(())
    }

    /// Configured trailing window, or [`DEFAULT_WINDOW_MONTHS`].
    pub fn window(&self) -> usize {
        self.window_months.unwrap_or(DEFAULT_WINDOW_MONTHS)
    }

    pub fn center_directory(&self) -> CenterDirectory {
        CenterDirectory::new(&self.centers)
    }
}

// ── Retreat centers ───────────────────────────────────────────────────────────

/// A named retreat location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetreatCenter {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Resolves a location to the human-readable name of its center.
pub trait CenterLookup {
    /// Label for `key`, or `None` when the location is unknown.
    fn center_label(&self, key: &LocationKey) -> Option<String>;
}

/// Table of known centers keyed by quantized coordinate.
#[derive(Debug, Clone, Default)]
pub struct CenterDirectory {
    labels: HashMap<LocationKey, String>,
}

impl CenterDirectory {
    /// Build the directory; a later center with the same key wins.
    pub fn new(centers: &[RetreatCenter]) -> Self {
        let labels = centers
            .iter()
            .map(|c| (LocationKey::from_coords(c.lat, c.lon), c.name.clone()))
            .collect();
        Self { labels }
    }
}

impl CenterLookup for CenterDirectory {
    fn center_label(&self, key: &LocationKey) -> Option<String> {
        self.labels.get(key).cloned()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
