//! Loading of the daily log and retreats tables.
//!
//! Both tables are plain CSV with a header row:
//!
//! * `daily_log.csv` – `Date,Hours`
//! * `retreats.csv` – `Name,Start,End,Duration_Days,Lat,Lon,Kind`

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use practice_core::models::{DailyRecord, RetreatEvent, RetreatKind};
use practice_core::time_utils::parse_date;
use practice_core::{PracticeError, Result};
use serde::Deserialize;
use tracing::{debug, warn};

// ── Row shapes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DailyLogRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Hours")]
    hours: f64,
}

#[derive(Debug, Deserialize)]
struct RetreatRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "End", default)]
    end: Option<String>,
    #[serde(rename = "Duration_Days", default)]
    duration_days: Option<i64>,
    #[serde(rename = "Lat")]
    lat: f64,
    #[serde(rename = "Lon")]
    lon: f64,
    #[serde(rename = "Kind")]
    kind: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the daily log at `path` as practice records.
pub fn load_daily_log(path: &Path) -> Result<Vec<DailyRecord>> {
    let records = read_daily_log(open_source(path)?)?;
    debug!("Loaded {} daily records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the retreats table at `path`.
pub fn load_retreats(path: &Path) -> Result<Vec<RetreatEvent>> {
    let retreats = read_retreats(open_source(path)?)?;
    debug!("Loaded {} retreats from {}", retreats.len(), path.display());
    Ok(retreats)
}

/// Parse a daily log from any reader.
///
/// Rows are returned sorted by date. A date listed more than once has its
/// hours summed.
pub fn read_daily_log<R: Read>(source: R) -> Result<Vec<DailyRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut duplicates = 0usize;

    for (index, row) in reader.deserialize::<DailyLogRow>().enumerate() {
        let line = data_line(index);
        let row = row?;
        let date = parse_row_date(&row.date, line)?;
        if !row.hours.is_finite() || row.hours < 0.0 {
            return Err(PracticeError::NegativeHours {
                date,
                hours: row.hours,
            });
        }
        if by_date.contains_key(&date) {
            duplicates += 1;
        }
        *by_date.entry(date).or_insert(0.0) += row.hours;
    }

    if duplicates > 0 {
        warn!("Daily log lists {} dates more than once; hours summed", duplicates);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, hours)| DailyRecord::practice(date, hours))
        .collect())
}

/// Parse a retreats table from any reader, in file order.
///
/// `Duration_Days` may be left empty, in which case it is derived as
/// `End - Start`. When both are present they must agree.
pub fn read_retreats<R: Read>(source: R) -> Result<Vec<RetreatEvent>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut retreats = Vec::new();

    for (index, row) in reader.deserialize::<RetreatRow>().enumerate() {
        let line = data_line(index);
        retreats.push(retreat_from_row(row?, line)?);
    }

    Ok(retreats)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open_source(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(PracticeError::SourceNotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|source| PracticeError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// 1-based file line of the `index`-th data row (the header is line 1).
fn data_line(index: usize) -> u64 {
    index as u64 + 2
}

fn parse_row_date(value: &str, line: u64) -> Result<NaiveDate> {
    parse_date(value).map_err(|_| PracticeError::InvalidRecord {
        line,
        reason: format!("invalid date \"{}\"", value.trim()),
    })
}

fn retreat_from_row(row: RetreatRow, line: u64) -> Result<RetreatEvent> {
    let start = parse_row_date(&row.start, line)?;
    let end = match row.end.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(parse_row_date(s, line)?),
        _ => None,
    };

    let days = match (row.duration_days, end) {
        (Some(days), Some(end)) => {
            let span = (end - start).num_days();
            if span != days {
                return Err(PracticeError::InconsistentRetreat {
                    name: row.name,
                    start,
                    detail: format!("Duration_Days is {} but End is {} days after Start", days, span),
                });
            }
            days
        }
        (Some(days), None) => days,
        (None, Some(end)) => (end - start).num_days(),
        (None, None) => {
            return Err(PracticeError::InvalidRecord {
                line,
                reason: format!("retreat '{}' has neither End nor Duration_Days", row.name),
            })
        }
    };

    let duration_days = u32::try_from(days)
        .ok()
        .filter(|d| *d >= 1)
        .ok_or_else(|| PracticeError::InvalidDuration {
            name: row.name.clone(),
            start,
            days,
        })?;

    let kind: RetreatKind = row.kind.parse().map_err(|_| PracticeError::InvalidRecord {
        line,
        reason: format!("unknown retreat kind \"{}\"", row.kind.trim()),
    })?;

    let event = RetreatEvent {
        name: row.name,
        start,
        duration_days,
        lat: row.lat,
        lon: row.lon,
        kind,
    };
    event.validate()?;
    Ok(event)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    // ── daily log ─────────────────────────────────────────────────────────────

    #[test]
    fn test_read_daily_log_sorted() {
        let csv = "Date,Hours\n2020-01-02,0.25\n2020-01-01,2\n";
        let records = read_daily_log(csv.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![
                DailyRecord::practice(date("2020-01-01"), 2.0),
                DailyRecord::practice(date("2020-01-02"), 0.25),
            ]
        );
    }

    #[test]
    fn test_read_daily_log_sums_duplicate_dates() {
        let csv = "Date,Hours\n2020-01-01,1\n2020-01-01,0.5\n";
        let records = read_daily_log(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hours, 1.5);
    }

    #[test]
    fn test_read_daily_log_bad_date_reports_line() {
        let csv = "Date,Hours\n2020-01-01,1\n2020-02-31,1\n";
        let err = read_daily_log(csv.as_bytes()).unwrap_err();
        match err {
            PracticeError::InvalidRecord { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("2020-02-31"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_read_daily_log_negative_hours() {
        let csv = "Date,Hours\n2020-01-01,-1\n";
        assert!(matches!(
            read_daily_log(csv.as_bytes()),
            Err(PracticeError::NegativeHours { .. })
        ));
    }

    #[test]
    fn test_read_daily_log_non_numeric_hours() {
        let csv = "Date,Hours\n2020-01-01,lots\n";
        assert!(matches!(
            read_daily_log(csv.as_bytes()),
            Err(PracticeError::Csv(_))
        ));
    }

    #[test]
    fn test_load_daily_log_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_daily_log(&tmp.path().join("daily_log.csv")).unwrap_err();
        assert!(matches!(err, PracticeError::SourceNotFound(_)));
    }

    #[test]
    fn test_load_daily_log_from_disk() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("daily_log.csv");
        std::fs::write(&path, "Date,Hours\n2023-01-01,0.5\n").expect("write");
        let records = load_daily_log(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    // ── retreats ──────────────────────────────────────────────────────────────

    const RETREATS: &str = "\
Name,Start,End,Duration_Days,Lat,Lon,Kind
10-day,2009-07-01,2009-07-11,10,51.93717047288657,-2.7183688422482426,Sat
3-day,2023-06-01,2023-06-04,3,46.551094113518346,-122.68237978383321,Served
";

    #[test]
    fn test_read_retreats() {
        let retreats = read_retreats(RETREATS.as_bytes()).unwrap();
        assert_eq!(retreats.len(), 2);
        assert_eq!(retreats[0].name, "10-day");
        assert_eq!(retreats[0].duration_days, 10);
        assert_eq!(retreats[0].end(), date("2009-07-11"));
        assert_eq!(retreats[0].lat, 51.93717047288657);
        assert_eq!(retreats[1].kind, RetreatKind::Served);
    }

    #[test]
    fn test_read_retreats_derives_missing_duration() {
        let csv = "Name,Start,End,Duration_Days,Lat,Lon,Kind\n\
                   10-day,2020-02-01,2020-02-06,,46.55,-122.68,Sat\n";
        let retreats = read_retreats(csv.as_bytes()).unwrap();
        assert_eq!(retreats[0].duration_days, 5);
    }

    #[test]
    fn test_read_retreats_without_end_column() {
        let csv = "Name,Start,Duration_Days,Lat,Lon,Kind\n\
                   3-day,2023-08-01,3,46.55,-122.68,Sat\n";
        let retreats = read_retreats(csv.as_bytes()).unwrap();
        assert_eq!(retreats[0].duration_days, 3);
    }

    #[test]
    fn test_read_retreats_without_duration_column() {
        let csv = "Name,Start,End,Lat,Lon,Kind\n\
                   10-day,2020-02-01,2020-02-11,46.55,-122.68,Sat\n";
        let retreats = read_retreats(csv.as_bytes()).unwrap();
        assert_eq!(retreats[0].duration_days, 10);
        assert_eq!(retreats[0].end(), date("2020-02-11"));
    }

    #[test]
    fn test_read_retreats_duration_past_calendar_end() {
        let csv = "Name,Start,Duration_Days,Lat,Lon,Kind\n\
                   Forever,2020-02-01,4294967295,46.55,-122.68,Sat\n";
        assert!(matches!(
            read_retreats(csv.as_bytes()),
            Err(PracticeError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_read_retreats_inconsistent_end() {
        let csv = "Name,Start,End,Duration_Days,Lat,Lon,Kind\n\
                   10-day,2020-02-01,2020-02-10,10,46.55,-122.68,Sat\n";
        assert!(matches!(
            read_retreats(csv.as_bytes()),
            Err(PracticeError::InconsistentRetreat { .. })
        ));
    }

    #[test]
    fn test_read_retreats_zero_duration() {
        let csv = "Name,Start,End,Duration_Days,Lat,Lon,Kind\n\
                   10-day,2020-02-01,2020-02-01,,46.55,-122.68,Sat\n";
        assert!(matches!(
            read_retreats(csv.as_bytes()),
            Err(PracticeError::InvalidDuration { days: 0, .. })
        ));
    }

    #[test]
    fn test_read_retreats_unknown_kind() {
        let csv = "Name,Start,End,Duration_Days,Lat,Lon,Kind\n\
                   10-day,2020-02-01,2020-02-11,10,46.55,-122.68,Walked\n";
        match read_retreats(csv.as_bytes()).unwrap_err() {
            PracticeError::InvalidRecord { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("Walked"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_retreats_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_retreats(&tmp.path().join("retreats.csv")).unwrap_err();
        assert!(matches!(err, PracticeError::SourceNotFound(_)));
    }
}
