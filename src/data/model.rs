use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of an ingested sheet
// ---------------------------------------------------------------------------

/// A loosely-typed cell value as it came out of the CSV or spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// `true` for nulls and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is accepted when it parses as a
    /// finite number after trimming; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Trimmed textual form, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one unvalidated row
// ---------------------------------------------------------------------------

/// One row of the source sheet: column name → cell. Column names are
/// canonical once the record has passed through
/// [`normalize_record`](super::headers::normalize_record).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: BTreeMap<String, CellValue>,
}

impl RawRecord {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.cells.keys()
    }

    pub fn into_cells(self) -> BTreeMap<String, CellValue> {
        self.cells
    }
}

impl FromIterator<(String, CellValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// WeighingRecord – one validated weighing event
// ---------------------------------------------------------------------------

/// A weighing that has a usable date and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeighingRecord {
    pub animal_id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub pasture: Option<String>,
    /// Upper-cased sex code, if the row had one.
    pub sex: Option<String>,
    pub age_months: Option<f64>,
}

// ---------------------------------------------------------------------------
// AnimalGainSummary – per-animal result
// ---------------------------------------------------------------------------

/// Placeholder used for a missing pasture or sex.
pub const NOT_AVAILABLE: &str = "N/A";

/// Aggregated weight gain for one animal with at least one valid interval.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalGainSummary {
    pub animal: String,
    pub pasture: String,
    pub sex: String,
    /// Age reported on the most recent weighing; `None` when absent.
    pub age_months: Option<f64>,
    /// Mean of the per-interval daily gains, rounded to 4 decimal places.
    pub average_daily_gain_kg: f64,
    pub weighing_count: usize,
    pub initial_weight_kg: f64,
    pub final_weight_kg: f64,
}

impl AnimalGainSummary {
    /// Age used for band membership: missing ages count as 0 and fractional
    /// months are truncated.
    pub fn age_for_banding(&self) -> f64 {
        self.age_months.map(f64::trunc).unwrap_or(0.0)
    }
}
