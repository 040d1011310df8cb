use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{PracticeError, Result};

/// ISO 8601 calendar date format used by every table and config file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Mean length of a Julian year, used for "per year" figures.
pub const DAYS_PER_YEAR: f64 = 365.25;

// ── Parsing / formatting ──────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date, trimming surrounding whitespace.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| PracticeError::InvalidDate(trimmed.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a month bucket key as `YYYY-MM`.
pub fn format_month(month_start: NaiveDate) -> String {
    month_start.format("%Y-%m").to_string()
}

// ── Calendar arithmetic ───────────────────────────────────────────────────────

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month, so with_day(1) cannot fail.
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    start.checked_add_months(Months::new(1)).unwrap_or(start)
}

/// Every month start from the month of `first` through the month of `last`,
/// inclusive. Empty when `last` precedes `first`.
pub fn month_starts_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let end = month_start(last);
    let mut current = month_start(first);
    let mut months = Vec::new();
    while current <= end {
        months.push(current);
        let next = next_month_start(current);
        if next == current {
            break;
        }
        current = next;
    }
    months
}

/// `date + days`, saturating at the calendar maximum.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Every date in `[start, end]`. Empty when `end < start`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Elapsed years between two dates (days / 365.25).
///
/// Returns `None` when no time has elapsed, so callers never divide by zero.
pub fn elapsed_years(from: NaiveDate, to: NaiveDate) -> Option<f64> {
    let days = (to - from).num_days();
    if days <= 0 {
        return None;
    }
    Some(days as f64 / DAYS_PER_YEAR)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date_valid_and_trimmed() {
        assert_eq!(
            parse_date(" 2024-02-29 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("2023-02-30").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date: 2023-02-30");
        assert!(parse_date("01/02/2023").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_format_date_and_month() {
        assert_eq!(format_date(date("2009-07-01")), "2009-07-01");
        assert_eq!(format_month(date("2009-07-01")), "2009-07");
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(date("2023-02-17")), date("2023-02-01"));
        assert_eq!(month_start(date("2023-02-01")), date("2023-02-01"));
    }

    #[test]
    fn test_next_month_start_wraps_year() {
        assert_eq!(next_month_start(date("2023-12-31")), date("2024-01-01"));
        assert_eq!(next_month_start(date("2024-01-31")), date("2024-02-01"));
    }

    #[test]
    fn test_month_starts_between_spans_gap() {
        let months = month_starts_between(date("2023-11-20"), date("2024-02-03"));
        assert_eq!(
            months,
            vec![
                date("2023-11-01"),
                date("2023-12-01"),
                date("2024-01-01"),
                date("2024-02-01"),
            ]
        );
    }

    #[test]
    fn test_month_starts_between_single_and_reversed() {
        assert_eq!(
            month_starts_between(date("2023-05-02"), date("2023-05-30")),
            vec![date("2023-05-01")]
        );
        assert!(month_starts_between(date("2023-06-01"), date("2023-05-01")).is_empty());
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(date("2020-01-01"), 10), date("2020-01-11"));
        assert_eq!(add_days(date("2020-02-28"), 1), date("2020-02-29"));
    }

    #[test]
    fn test_inclusive_days() {
        let days: Vec<_> = inclusive_days(date("2020-01-30"), date("2020-02-02")).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date("2020-01-30"));
        assert_eq!(days[3], date("2020-02-02"));
        assert_eq!(inclusive_days(date("2020-01-02"), date("2020-01-01")).count(), 0);
    }

    #[test]
    fn test_elapsed_years_guards_zero() {
        assert!(elapsed_years(date("2020-01-01"), date("2020-01-01")).is_none());
        assert!(elapsed_years(date("2020-01-02"), date("2020-01-01")).is_none());
        let years = elapsed_years(date("2020-01-01"), date("2021-01-01")).unwrap();
        assert!((years - 366.0 / 365.25).abs() < 1e-12);
    }
}
