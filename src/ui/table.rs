use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::CellValue;
use crate::data::table::{SortDirection, TableColumn};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Paginated, sortable, filterable data table
// ---------------------------------------------------------------------------

pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    filter_bar(ui, state);
    ui.add_space(4.0);

    let mut sort_clicked: Option<TableColumn> = None;
    let mut delete_clicked: Option<usize> = None;

    TableBuilder::new(ui)
        .id_salt("covid_table")
        .striped(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::exact(18.0))
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(70.0), TableColumn::ALL.len() - 1)
        .header(20.0, |mut header| {
            header.col(|_ui| {});
            for column in TableColumn::ALL {
                header.col(|ui| {
                    let arrow = match state.sort_direction(column) {
                        Some(SortDirection::Asc) => " ▲",
                        Some(SortDirection::Desc) => " ▼",
                        None => "",
                    };
                    let text = RichText::new(format!("{column}{arrow}")).strong();
                    if ui.button(text).clicked() {
                        sort_clicked = Some(column);
                    }
                });
            }
        })
        .body(|mut body| {
            for (i, row) in state.page_rows.iter().enumerate() {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        if ui.small_button("×").on_hover_text("Remove row").clicked() {
                            delete_clicked = Some(i);
                        }
                    });
                    for column in TableColumn::ALL {
                        table_row.col(|ui| {
                            let value = column.value(row);
                            match value {
                                CellValue::Text(_) => {
                                    ui.label(value.to_string());
                                }
                                _ => {
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                        ui.label(value.to_string());
                                    });
                                }
                            }
                        });
                    }
                });
            }
        });

    if let Some(column) = sort_clicked {
        state.toggle_sort(column);
    }
    if let Some(i) = delete_clicked {
        state.delete_row(i);
    }

    ui.add_space(4.0);
    pager(ui, state);
}

fn filter_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Filter");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.filter_input)
                .hint_text("{Confirmed} > 1000 && {Country/Region} contains land")
                .desired_width(f32::INFINITY),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            let query = state.filter_input.clone();
            state.set_filter_query(&query);
        }
    });
}

fn pager(ui: &mut Ui, state: &mut AppState) {
    let current = state.table_query.page_current;
    let pages = state.page_count();

    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(current > 0, egui::Button::new("◀")).clicked() {
            state.set_page(current - 1);
        }
        ui.label(format!("{} / {}", current + 1, pages));
        if ui.add_enabled(current + 1 < pages, egui::Button::new("▶")).clicked() {
            state.set_page(current + 1);
        }

        ui.separator();
        ui.label(format!("{} matching rows", state.matching_rows));

        ui.separator();
        let mut page_size = state.table_query.page_size;
        if ui
            .add(egui::DragValue::new(&mut page_size).range(1..=100).prefix("rows/page "))
            .changed()
        {
            state.set_page_size(page_size);
        }
    });
}
