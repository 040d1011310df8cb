//! Human-readable number formatting for report output.

/// Format `value` with `decimals` fractional digits and comma thousands
/// separators.
///
/// # Examples
///
/// ```
/// use practice_core::formatting::format_number;
///
/// assert_eq!(format_number(11_304.75, 0), "11,305");
/// assert_eq!(format_number(48.5, 1), "48.5");
/// assert_eq!(format_number(-1_250.0, 2), "-1,250.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // "-0" is noise once rounded away.
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an hour total for the headline metrics, e.g. `"11,305 h"`.
pub fn format_hours(hours: f64) -> String {
    format!("{} h", format_number(hours, 0))
}

/// Format an optional statistic, rendering a missing value as `"n/a"`.
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => "n/a".to_string(),
    }
}

/// `(part / whole) * 100` rounded to `decimal_places`; `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimal_places as i32);
    ((part / whole) * 100.0 * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
