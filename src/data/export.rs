use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use super::filter::{AgeBand, FilterState, FilteredView};
use super::model::AnimalGainSummary;
use crate::error::ExportError;

const FILE_NAME_PREFIX: &str = "weight_gain_analysis";

// ---------------------------------------------------------------------------
// Export rows
// ---------------------------------------------------------------------------

/// Position of an animal relative to the filtered mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

/// One line of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Animal")]
    pub animal: String,
    #[serde(rename = "Pasture")]
    pub pasture: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age", serialize_with = "whole_opt")]
    pub age_months: Option<f64>,
    #[serde(rename = "Daily Gain")]
    pub daily_gain_kg: f64,
    #[serde(rename = "Initial Weight", serialize_with = "whole")]
    pub initial_weight_kg: f64,
    #[serde(rename = "Final Weight", serialize_with = "whole")]
    pub final_weight_kg: f64,
    #[serde(rename = "Weighing Count")]
    pub weighing_count: usize,
    #[serde(rename = "Status")]
    pub status: Status,
}

impl ExportRow {
    fn new(summary: &AnimalGainSummary, view: &FilteredView<'_>) -> Self {
        let status = if view.is_above(summary) {
            Status::AboveAverage
        } else {
            Status::BelowAverage
        };
        Self {
            animal: summary.animal.clone(),
            pasture: summary.pasture.clone(),
            sex: summary.sex.clone(),
            age_months: summary.age_months,
            daily_gain_kg: summary.average_daily_gain_kg,
            initial_weight_kg: summary.initial_weight_kg,
            final_weight_kg: summary.final_weight_kg,
            weighing_count: summary.weighing_count,
            status,
        }
    }
}

/// Whole numbers go out without a trailing `.0`, as they were typed.
fn whole<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn whole_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => whole(v, serializer),
        None => serializer.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the filtered summaries as CSV with a header row.
///
/// Returns [`ExportError::Empty`] without writing anything when the view
/// has no records.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<(), ExportError> {
    if view.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut writer = csv::Writer::from_writer(writer);
    for summary in &view.records {
        writer.serialize(ExportRow::new(summary, view))?;
    }
    writer.flush()?;
    Ok(())
}

/// [`write_csv`] into a `String`.
pub fn to_csv_string(view: &FilteredView<'_>) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the export to `path`. The file is only created when there is
/// something to write.
pub fn export_to_path(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    if view.is_empty() {
        return Err(ExportError::Empty);
    }
    let file = std::fs::File::create(path)?;
    write_csv(view, file)?;
    log::info!("Exported {} animals to {}", view.records.len(), path.display());
    Ok(())
}

/// File name recording which filters produced the export, e.g.
/// `weight_gain_analysis_North_6-12months_F.csv`.
pub fn export_file_name(filters: &FilterState) -> String {
    let mut name = FILE_NAME_PREFIX.to_string();
    if let Some(pasture) = filters.pasture.value() {
        name.push('_');
        name.push_str(&file_safe(pasture));
    }
    if filters.age_band != AgeBand::All {
        name.push('_');
        name.push_str(filters.age_band.key());
        name.push_str("months");
    }
    if let Some(sex) = filters.sex.value() {
        name.push('_');
        name.push_str(&file_safe(sex));
    }
    name.push_str(".csv");
    name
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selection;

    fn summary(animal: &str, pasture: &str, gain: f64) -> AnimalGainSummary {
        AnimalGainSummary {
            animal: animal.into(),
            pasture: pasture.into(),
            sex: "M".into(),
            age_months: Some(10.0),
            average_daily_gain_kg: gain,
            weighing_count: 3,
            initial_weight_kg: 180.0,
            final_weight_kg: 240.5,
        }
    }

    #[test]
    fn header_and_status_column() {
        let herd = vec![summary("A", "North", 0.9), summary("B", "North", 0.3)];
        let view = FilteredView::new(&herd, &FilterState::default());
        let csv = to_csv_string(&view).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Animal,Pasture,Sex,Age,Daily Gain,Initial Weight,Final Weight,\
                 Weighing Count,Status"
            )
        );
        assert!(lines.next().unwrap().ends_with(",Above Average"));
        assert!(lines.next().unwrap().ends_with(",Below Average"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn status_uses_the_displayed_mean() {
        // Mean is 0.100033..., shown as 0.1; A sits exactly on it.
        let herd = vec![
            summary("A", "North", 0.1),
            summary("B", "North", 0.1),
            summary("C", "North", 0.1001),
        ];
        let view = FilteredView::new(&herd, &FilterState::default());
        assert_eq!(view.stats().mean, 0.1);

        let text = to_csv_string(&view).unwrap();
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<ExportRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        let statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, [Status::AboveAverage; 3]);
    }

    #[test]
    fn whole_numbers_have_no_fraction() {
        let mut fractional = summary("B", "North", 0.3);
        fractional.age_months = Some(10.5);
        fractional.initial_weight_kg = 180.25;
        let herd = vec![summary("A", "North", 0.9), fractional];
        let view = FilteredView::new(&herd, &FilterState::default());
        let csv = to_csv_string(&view).unwrap();
        let mut lines = csv.lines().skip(1);
        assert_eq!(lines.next(), Some("A,North,M,10,0.9,180,240.5,3,Above Average"));
        assert_eq!(lines.next(), Some("B,North,M,10.5,0.3,180.25,240.5,3,Below Average"));
    }

    #[test]
    fn missing_age_is_an_empty_field() {
        let mut unknown = summary("A", "North", 0.9);
        unknown.age_months = None;
        let herd = vec![unknown];
        let view = FilteredView::new(&herd, &FilterState::default());
        let csv = to_csv_string(&view).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("A,North,M,,0.9,"));
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        let herd = vec![summary("A", "North, upper", 0.9)];
        let view = FilteredView::new(&herd, &FilterState::default());
        let csv = to_csv_string(&view).unwrap();
        assert!(csv.contains("\"North, upper\""));
    }

    #[test]
    fn empty_view_is_refused() {
        let herd: Vec<AnimalGainSummary> = Vec::new();
        let view = FilteredView::new(&herd, &FilterState::default());
        assert!(matches!(to_csv_string(&view), Err(ExportError::Empty)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(matches!(export_to_path(&view, &path), Err(ExportError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn file_name_encodes_filters() {
        assert_eq!(export_file_name(&FilterState::default()), "weight_gain_analysis.csv");
        let filters = FilterState {
            pasture: Selection::Only("North".into()),
            age_band: AgeBand::Weaning,
            sex: Selection::Only("F".into()),
        };
        assert_eq!(
            export_file_name(&filters),
            "weight_gain_analysis_North_6-12months_F.csv"
        );
        let odd = FilterState {
            pasture: Selection::Only("A/B".into()),
            ..FilterState::default()
        };
        assert_eq!(export_file_name(&odd), "weight_gain_analysis_A_B.csv");
    }
}
