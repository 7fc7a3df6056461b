use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CovidDashApp {
    pub state: AppState,
}

impl CovidDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CovidDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar, title, summary cards ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            ui.add_space(4.0);
            panels::header(ui, &self.state);
            ui.add_space(4.0);
        });

        // ---- Bottom panel: year dropdown ----
        egui::TopBottomPanel::bottom("year_bar").show(ctx, |ui| {
            panels::year_selector(ui, &mut self.state);
        });

        // ---- Left side panel: world map and hovered country ----
        egui::SidePanel::left("map_panel")
            .default_width(ctx.screen_rect().width() * 0.5)
            .resizable(true)
            .show(ctx, |ui| {
                map::world_map(ui, &mut self.state);
                ui.separator();
                plot::country_time_series(ui, &self.state);
            });

        // ---- Central panel: stacked bars and table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::stacked_bar_chart(ui, &self.state);
            ui.separator();
            table::data_table(ui, &mut self.state);
        });
    }
}
