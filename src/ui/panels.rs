use eframe::egui::{self, Color32, RichText, Ui};

use rusty_ox::data::filter::{sex_label, AgeBand, Selection};
use rusty_ox::data::loader::SUPPORTED_EXTENSIONS;
use rusty_ox::state::{AppState, Message};

use super::{ABOVE_COLOR, BELOW_COLOR};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let AppState {
        dataset, filters, ..
    } = state;
    let Some(dataset) = dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.strong("Pasture");
    selection_combo(
        ui,
        "pasture",
        "All pastures",
        &dataset.pasture_options,
        &mut filters.pasture,
        |p| p.to_string(),
    );
    ui.add_space(6.0);

    ui.strong("Age band");
    egui::ComboBox::from_id_salt("age_band")
        .selected_text(filters.age_band.label())
        .show_ui(ui, |ui: &mut Ui| {
            for band in AgeBand::ALL {
                ui.selectable_value(&mut filters.age_band, band, band.label());
            }
        });
    ui.add_space(6.0);

    ui.strong("Sex");
    selection_combo(ui, "sex", "All sexes", &dataset.sex_options, &mut filters.sex, |s| {
        sex_label(s).to_string()
    });

    let active = filters.active_labels();
    if !active.is_empty() {
        ui.add_space(6.0);
        for label in active {
            ui.label(RichText::new(label).small().strong());
        }
        if ui.small_button("Clear filters").clicked() {
            *filters = Default::default();
        }
    }

    ui.separator();

    // ---- Statistics of the filtered view ----
    let view = state.view();
    let stats = view.stats();
    ui.heading("Statistics");
    ui.label(format!("Animals: {}", stats.count));
    ui.label(format!("Mean daily gain: {} kg/day", stats.mean));
    ui.label(RichText::new(format!("Above mean: {}", stats.above)).color(ABOVE_COLOR));
    ui.label(RichText::new(format!("Below mean: {}", stats.below)).color(BELOW_COLOR));
    let count = stats.count;

    ui.separator();
    if ui.button(format!("Export CSV ({count} animals)")).clicked() {
        export_dialog(state);
    }
}

/// Combo box over `All` plus one entry per option.
fn selection_combo(
    ui: &mut Ui,
    id: &str,
    all_label: &str,
    options: &[String],
    selection: &mut Selection,
    display: impl Fn(&str) -> String,
) {
    let selected_text = match selection.value() {
        Some(v) => display(v),
        None => all_label.to_string(),
    };
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(selection, Selection::All, all_label);
            for option in options {
                ui.selectable_value(selection, Selection::Only(option.clone()), display(option));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} rows, {} animals, {} visible",
                ds.source_name,
                ds.row_count,
                ds.summaries.len(),
                state.view().records.len()
            ));
        }

        match &state.message {
            Some(Message::Error(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Message::Info(msg)) => {
                ui.separator();
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open weighing records")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    if state.view().is_empty() {
        state.message = Some(Message::Info("No data to export".to_string()));
        return;
    }
    let file = rfd::FileDialog::new()
        .set_title("Export filtered results")
        .set_file_name(state.export_file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
