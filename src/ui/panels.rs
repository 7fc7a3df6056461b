use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::YEARS;
use crate::data::loader::{DataSource, load_dataset};
use crate::data::model::SeriesKind;
use crate::data::reshape::{format_total, last_column};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let source = state.source.clone();
                load_into(state, source);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let last_date = last_column(&ds.confirmed).unwrap_or("-");
            ui.label(format!(
                "{} regions, latest {}",
                state.main_table.len(),
                last_date
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Title and summary cards
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui, state: &AppState) {
    ui.heading("Covid-19 Global Visualization");
    ui.add_space(4.0);

    ui.columns(SeriesKind::ALL.len(), |columns| {
        for (ui, kind) in columns.iter_mut().zip(SeriesKind::ALL) {
            let (title, fill) = match kind {
                SeriesKind::Confirmed => ("WORLD CONFIRMED CASES", Color32::from_rgb(23, 162, 184)),
                SeriesKind::Recovered => ("WORLD RECOVERED CASES", Color32::from_rgb(40, 167, 69)),
                SeriesKind::Dead => ("WORLD DEAD CASES", Color32::from_rgb(108, 117, 125)),
            };
            summary_card(ui, title, &format_total(state.totals.get(kind)), fill);
        }
    });
}

fn summary_card(ui: &mut Ui, title: &str, value: &str, fill: Color32) {
    egui::Frame::group(ui.style())
        .fill(fill)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).size(12.0).strong().color(Color32::WHITE));
            ui.label(RichText::new(value).size(15.0).strong().color(Color32::WHITE));
        });
}

// ---------------------------------------------------------------------------
// Bottom bar
// ---------------------------------------------------------------------------

pub fn year_selector(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Year");
        let mut selected = state.year.clone();
        egui::ComboBox::from_id_salt("year")
            .selected_text(&selected)
            .show_ui(ui, |ui: &mut Ui| {
                for year in YEARS {
                    ui.selectable_value(&mut selected, year.to_string(), *year);
                }
            });
        state.set_year(&selected);
    });
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with the CSSE time-series CSVs")
        .pick_folder();

    if let Some(dir) = folder {
        load_into(state, DataSource::Local { dir });
    }
}

/// Load from `source` and replace the dataset, or report the failure.
pub fn load_into(state: &mut AppState, source: DataSource) {
    match load_dataset(&source) {
        Ok(dataset) => {
            state.source = source;
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            state.set_load_error(&e);
        }
    }
}
