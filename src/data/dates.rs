use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Formats tried by the general fallback, after the fixed patterns.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Fallback parses at or before this year are treated as garbage.
const MIN_FALLBACK_YEAR: i32 = 1990;

/// Convert a cell into a calendar date, or `None` when it cannot be read.
///
/// Resolution order:
/// 1. numeric text longer than 4 characters is a spreadsheet serial day;
/// 2. `D/M/YYYY`, then `YYYY-M-D`, then `D-M-YYYY` (first shape that
///    matches decides, even if its components are out of range);
/// 3. a handful of general formats, accepted only after 1990.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    let text = value.as_text()?;

    if text.len() > 4 {
        if let Ok(serial) = text.parse::<f64>() {
            if !serial.is_finite() {
                return None;
            }
            return from_serial(serial.trunc() as i64);
        }
    }

    if let Some(parts) = split_numeric(&text, '/', [(1, 2), (1, 2), (4, 4)]) {
        let [d, m, y] = parts;
        return ymd(y, m, d);
    }
    if let Some(parts) = split_numeric(&text, '-', [(4, 4), (1, 2), (1, 2)]) {
        let [y, m, d] = parts;
        return ymd(y, m, d);
    }
    if let Some(parts) = split_numeric(&text, '-', [(1, 2), (1, 2), (4, 4)]) {
        let [d, m, y] = parts;
        return ymd(y, m, d);
    }

    parse_general(&text).filter(|date| date.year() > MIN_FALLBACK_YEAR)
}

/// Spreadsheet serial day to calendar date.
///
/// Serial `n` is day `n` counted from 1899-12-31, minus one day for the
/// 1900-02-29 that spreadsheets count but the calendar never had.
pub fn from_serial(serial: i64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let offset = Days::new(serial.unsigned_abs());
    if serial >= 0 {
        epoch.checked_add_days(offset)
    } else {
        epoch.checked_sub_days(offset)
    }
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Split `text` on `sep` into exactly three all-digit parts whose lengths
/// fall within the given inclusive bounds.
fn split_numeric(text: &str, sep: char, widths: [(usize, usize); 3]) -> Option<[u32; 3]> {
    let mut parts = text.split(sep);
    let mut out = [0u32; 3];
    for (slot, (min, max)) in out.iter_mut().zip(widths) {
        let part = parts.next()?;
        if part.len() < min || part.len() > max || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn parse_general(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}
