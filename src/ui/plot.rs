use eframe::egui::{Color32, Ui};
use egui_plot::{HLine, Legend, Plot, Points};

use rusty_ox::data::filter::{FilteredView, ScatterPoint};

use super::{ABOVE_COLOR, BELOW_COLOR};

// ---------------------------------------------------------------------------
// Daily gain scatter (central panel)
// ---------------------------------------------------------------------------

/// Rank-ordered scatter of daily gains, split at the filtered mean.
pub fn gain_scatter(ui: &mut Ui, view: &FilteredView<'_>) {
    let points = view.scatter_points();
    let mean = view.display_mean();

    // Tooltip lookup by rank, owned so the formatter can outlive `view`.
    let tooltips: Vec<String> = points
        .iter()
        .map(|p| {
            let s = p.summary;
            format!(
                "Animal: {}\nPasture: {}\nSex: {}\nDaily gain: {} kg/day",
                s.animal, s.pasture, s.sex, p.gain
            )
        })
        .collect();

    let (above, below): (Vec<&ScatterPoint<'_>>, Vec<&ScatterPoint<'_>>) =
        points.iter().partition(|p| p.above_mean);

    Plot::new("gain_scatter")
        .legend(Legend::default())
        .x_axis_label("Animals (rank)")
        .y_axis_label("Daily gain (kg/day)")
        .height(ui.available_height() * 0.5)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |_name, value| {
            let rank = value.x.round();
            if rank >= 1.0 {
                if let Some(text) = tooltips.get(rank as usize - 1) {
                    return text.clone();
                }
            }
            String::new()
        })
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(series(&above))
                    .name("Above mean")
                    .color(ABOVE_COLOR)
                    .radius(4.0),
            );
            plot_ui.points(
                Points::new(series(&below))
                    .name("Below mean")
                    .color(BELOW_COLOR)
                    .radius(4.0),
            );
            plot_ui.hline(
                HLine::new(mean)
                    .name(format!("Mean: {mean} kg/day"))
                    .color(Color32::GRAY),
            );
        });
}

fn series(points: &[&ScatterPoint<'_>]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.rank as f64, p.gain]).collect()
}
