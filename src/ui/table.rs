use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_ox::data::filter::{sex_label, FilteredView};

use super::{ABOVE_COLOR, BELOW_COLOR};

const HEADERS: [&str; 8] = [
    "Animal",
    "Pasture",
    "Sex",
    "Age (months)",
    "Daily gain (kg/day)",
    "Initial weight (kg)",
    "Final weight (kg)",
    "Weighings",
];

// ---------------------------------------------------------------------------
// Results table (central panel, below the chart)
// ---------------------------------------------------------------------------

/// One row per animal in the filtered view.
pub fn summary_table(ui: &mut Ui, view: &FilteredView<'_>) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(70.0), HEADERS.len())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.records.len(), |mut row| {
                let Some(s) = view.records.get(row.index()) else {
                    return;
                };
                let gain_color = if view.is_above(s) { ABOVE_COLOR } else { BELOW_COLOR };

                row.col(|ui| {
                    ui.label(&s.animal);
                });
                row.col(|ui| {
                    ui.label(&s.pasture);
                });
                row.col(|ui| {
                    ui.label(sex_label(&s.sex));
                });
                row.col(|ui| {
                    ui.label(s.age_months.map(|a| a.to_string()).unwrap_or_default());
                });
                row.col(|ui| {
                    let gain = RichText::new(s.average_daily_gain_kg.to_string());
                    ui.label(gain.color(gain_color).strong());
                });
                row.col(|ui| {
                    ui.label(s.initial_weight_kg.to_string());
                });
                row.col(|ui| {
                    ui.label(s.final_weight_kg.to_string());
                });
                row.col(|ui| {
                    ui.label(s.weighing_count.to_string());
                });
            });
        });
}
