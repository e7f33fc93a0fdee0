use std::fmt;

use super::gain::round4;
use super::model::{AnimalGainSummary, NOT_AVAILABLE};

// ---------------------------------------------------------------------------
// Age bands
// ---------------------------------------------------------------------------

/// Fixed age ranges in months, lower bound inclusive, upper bound exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeBand {
    #[default]
    All,
    Calves,
    Weaning,
    Rearing,
    Finishing,
    Adults,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::All,
        AgeBand::Calves,
        AgeBand::Weaning,
        AgeBand::Rearing,
        AgeBand::Finishing,
        AgeBand::Adults,
    ];

    /// Short key, also used in export file names.
    pub fn key(self) -> &'static str {
        match self {
            AgeBand::All => "all",
            AgeBand::Calves => "0-6",
            AgeBand::Weaning => "6-12",
            AgeBand::Rearing => "12-18",
            AgeBand::Finishing => "18-24",
            AgeBand::Adults => "24+",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::All => "All ages",
            AgeBand::Calves => "0-6 months (calves)",
            AgeBand::Weaning => "6-12 months (weaning)",
            AgeBand::Rearing => "12-18 months (rearing)",
            AgeBand::Finishing => "18-24 months (finishing)",
            AgeBand::Adults => "24+ months (adults)",
        }
    }

    /// `(min, max)` in months.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            AgeBand::All => (0.0, f64::INFINITY),
            AgeBand::Calves => (0.0, 6.0),
            AgeBand::Weaning => (6.0, 12.0),
            AgeBand::Rearing => (12.0, 18.0),
            AgeBand::Finishing => (18.0, 24.0),
            AgeBand::Adults => (24.0, f64::INFINITY),
        }
    }

    pub fn contains(self, age_months: f64) -> bool {
        let (min, max) = self.bounds();
        min <= age_months && age_months < max
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.key() == key)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// A categorical selector: everything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

/// The user's current pasture / age band / sex constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub pasture: Selection,
    pub age_band: AgeBand,
    pub sex: Selection,
}

impl FilterState {
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn matches(&self, summary: &AnimalGainSummary) -> bool {
        self.pasture.matches(&summary.pasture)
            && (self.age_band == AgeBand::All || self.age_band.contains(summary.age_for_banding()))
            && self.sex.matches(&summary.sex)
    }

    /// Human-readable chips for the constraints that are not "all".
    pub fn active_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(p) = self.pasture.value() {
            labels.push(format!("Pasture: {p}"));
        }
        if self.age_band != AgeBand::All {
            labels.push(format!("Age: {}", self.age_band.label()));
        }
        if let Some(s) = self.sex.value() {
            labels.push(format!("Sex: {}", sex_label(s)));
        }
        labels
    }
}

/// Display name for a sex code.
pub fn sex_label(code: &str) -> &str {
    match code {
        "M" => "Male",
        "F" => "Female",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Filtered view and aggregates
// ---------------------------------------------------------------------------

/// Summaries that pass the filters, together with their mean gain.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a AnimalGainSummary>,
    /// Mean `average_daily_gain_kg` of `records`; 0 when empty.
    pub mean: f64,
}

/// Aggregate counters shown next to the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStats {
    pub count: usize,
    pub mean: f64,
    pub above: usize,
    pub below: usize,
}

/// One point of the rank-ordered scatter chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint<'a> {
    /// 1-based position in the filtered sequence.
    pub rank: usize,
    pub gain: f64,
    pub above_mean: bool,
    pub summary: &'a AnimalGainSummary,
}

impl<'a> FilteredView<'a> {
    /// Apply `filters` to `summaries` and recompute the mean over the result.
    pub fn new(summaries: &'a [AnimalGainSummary], filters: &FilterState) -> Self {
        let records: Vec<&AnimalGainSummary> =
            summaries.iter().filter(|s| filters.matches(s)).collect();
        let mean = mean_gain(&records);
        Self { records, mean }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean rounded to 4 decimal places, for display.
    pub fn display_mean(&self) -> f64 {
        round4(self.mean)
    }

    /// At or above the mean of this view, not of the whole dataset. Gains are
    /// already rounded, so they are compared against the displayed mean.
    pub fn is_above(&self, summary: &AnimalGainSummary) -> bool {
        summary.average_daily_gain_kg >= self.display_mean()
    }

    pub fn stats(&self) -> GainStats {
        let above = self.records.iter().filter(|s| self.is_above(s)).count();
        GainStats {
            count: self.records.len(),
            mean: self.display_mean(),
            above,
            below: self.records.len() - above,
        }
    }

    pub fn scatter_points(&self) -> Vec<ScatterPoint<'a>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, &s)| ScatterPoint {
                rank: i + 1,
                gain: s.average_daily_gain_kg,
                above_mean: self.is_above(s),
                summary: s,
            })
            .collect()
    }
}

/// Arithmetic mean of the daily gains; an empty set has mean 0.
pub fn mean_gain(records: &[&AnimalGainSummary]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|s| s.average_daily_gain_kg).sum::<f64>() / records.len() as f64
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

/// Distinct pastures in first-seen order.
pub fn pasture_options(summaries: &[AnimalGainSummary]) -> Vec<String> {
    distinct(summaries.iter().map(|s| s.pasture.as_str()))
}

/// Distinct sex codes in first-seen order, without the "N/A" placeholder.
pub fn sex_options(summaries: &[AnimalGainSummary]) -> Vec<String> {
    distinct(
        summaries
            .iter()
            .map(|s| s.sex.as_str())
            .filter(|s| *s != NOT_AVAILABLE),
    )
}

fn distinct<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(
        animal: &str,
        pasture: &str,
        sex: &str,
        age: Option<f64>,
        gain: f64,
    ) -> AnimalGainSummary {
        AnimalGainSummary {
            animal: animal.into(),
            pasture: pasture.into(),
            sex: sex.into(),
            age_months: age,
            average_daily_gain_kg: gain,
            weighing_count: 2,
            initial_weight_kg: 100.0,
            final_weight_kg: 120.0,
        }
    }

    fn herd() -> Vec<AnimalGainSummary> {
        vec![
            summary("A", "North", "M", Some(4.0), 0.8),
            summary("B", "North", "F", Some(12.0), 0.4),
            summary("C", "South", "M", Some(8.0), 0.6),
            summary("D", "South", "N/A", None, 1.0),
        ]
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let herd = vec![summary("X", "P", "M", Some(12.0), 1.0)];
        let filters = FilterState {
            age_band: AgeBand::Weaning,
            ..FilterState::default()
        };
        assert!(FilteredView::new(&herd, &filters).is_empty());
        assert!(AgeBand::Rearing.contains(12.0));
    }

    #[test]
    fn all_band_keeps_out_of_range_ages() {
        let herd = vec![summary("N", "P", "M", Some(-1.0), 0.5)];
        let view = FilteredView::new(&herd, &FilterState::default());
        assert_eq!(view.records.len(), 1);
        assert!(!AgeBand::Calves.contains(-1.0));
    }

    #[test]
    fn missing_age_counts_as_zero() {
        let herd = herd();
        let filters = FilterState {
            age_band: AgeBand::Calves,
            ..FilterState::default()
        };
        let view = FilteredView::new(&herd, &filters);
        let names: Vec<&str> = view.records.iter().map(|s| s.animal.as_str()).collect();
        assert_eq!(names, ["A", "D"]);
    }

    #[test]
    fn all_selection_is_a_no_op() {
        let herd = herd();
        let view = FilteredView::new(&herd, &FilterState::default());
        assert_eq!(view.records.len(), herd.len());
        assert!(FilterState::default().is_unfiltered());
    }

    #[test]
    fn filters_combine() {
        let herd = herd();
        let filters = FilterState {
            pasture: Selection::Only("South".into()),
            age_band: AgeBand::Weaning,
            sex: Selection::Only("M".into()),
        };
        let view = FilteredView::new(&herd, &filters);
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].animal, "C");
        assert_eq!(view.mean, 0.6);
    }

    #[test]
    fn empty_view_has_zero_mean() {
        let herd = herd();
        let filters = FilterState {
            pasture: Selection::Only("Nowhere".into()),
            ..FilterState::default()
        };
        let view = FilteredView::new(&herd, &filters);
        assert_eq!(view.mean, 0.0);
        assert_eq!(
            view.stats(),
            GainStats {
                count: 0,
                mean: 0.0,
                above: 0,
                below: 0
            }
        );
    }

    #[test]
    fn above_average_is_relative_to_filtered_mean() {
        let herd = herd();
        let global = FilteredView::new(&herd, &FilterState::default());
        // Global mean is 0.7, so B (0.4) and C (0.6) are below.
        assert_eq!(global.stats().above, 2);

        let north = FilteredView::new(
            &herd,
            &FilterState {
                pasture: Selection::Only("North".into()),
                ..FilterState::default()
            },
        );
        // North mean is 0.6; A is above, B below.
        let points = north.scatter_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].rank, 1);
        assert!(points[0].above_mean);
        assert!(!points[1].above_mean);
    }

    #[test]
    fn value_equal_to_mean_is_above() {
        let herd = vec![summary("A", "P", "M", None, 0.5), summary("B", "P", "M", None, 0.5)];
        let view = FilteredView::new(&herd, &FilterState::default());
        assert_eq!(view.stats().above, 2);
    }

    #[test]
    fn options_are_distinct_and_skip_placeholder_sex() {
        let herd = herd();
        assert_eq!(pasture_options(&herd), ["North", "South"]);
        assert_eq!(sex_options(&herd), ["M", "F"]);
    }

    #[test]
    fn active_labels_only_for_constrained_dimensions() {
        let filters = FilterState {
            pasture: Selection::Only("North".into()),
            age_band: AgeBand::All,
            sex: Selection::Only("F".into()),
        };
        assert_eq!(filters.active_labels(), ["Pasture: North", "Sex: Female"]);
    }

    #[test]
    fn age_band_keys_round_trip() {
        for band in AgeBand::ALL {
            assert_eq!(AgeBand::from_key(band.key()), Some(band));
        }
        assert_eq!(AgeBand::from_key("99+"), None);
    }
}
