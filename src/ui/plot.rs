use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{
    Bar, BarChart, Corner, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Text,
};

use crate::color::generate_palette;
use crate::data::model::SeriesKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Country time series
// ---------------------------------------------------------------------------

/// One line per series type for the hovered region, annotated with its name.
pub fn country_time_series(ui: &mut Ui, state: &AppState) {
    let series = &state.country_series;
    let colors = generate_palette(SeriesKind::ALL.len());
    let dates = series.dates.clone();

    let top = series
        .lines
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|p| p[1]))
        .filter(|v| !v.is_nan())
        .fold(0.0_f64, f64::max);

    Plot::new("country_time_series")
        .height(185.0)
        .legend(Legend::default().position(Corner::LeftBottom))
        .show_grid([false, true])
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| index_label(&dates, mark.value))
        .show(ui, |plot_ui| {
            for (kind, points) in &series.lines {
                let line = Line::new(PlotPoints::from(points.clone()))
                    .name(kind.label())
                    .color(colors[*kind as usize])
                    .width(1.5);
                plot_ui.line(line);
            }

            plot_ui.text(
                Text::new(
                    PlotPoint::new(0.0, top),
                    RichText::new(&series.region).strong(),
                )
                .anchor(Align2::LEFT_BOTTOM),
            );
        });
}

/// Label of the category at an integer axis position; empty between categories.
fn index_label(labels: &[String], value: f64) -> String {
    if value < 0.0 || value.fract() != 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stacked bar chart of the current table page
// ---------------------------------------------------------------------------

pub fn stacked_bar_chart(ui: &mut Ui, state: &AppState) {
    let bars = &state.bar_chart;
    let colors = generate_palette(SeriesKind::ALL.len());
    let regions = bars.regions.clone();

    let mut charts: Vec<BarChart> = Vec::with_capacity(bars.series.len());
    for (kind, heights) in &bars.series {
        let chart_bars = heights
            .iter()
            .zip(&bars.regions)
            .enumerate()
            .map(|(i, (h, region))| Bar::new(i as f64, *h).name(region).width(0.6))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(chart_bars)
            .name(kind.short_name())
            .color(colors[*kind as usize])
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("stacked_bar_chart")
        .height(250.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_drag(false)
        .x_axis_formatter(move |mark: GridMark, _range| index_label(&regions, mark.value))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
