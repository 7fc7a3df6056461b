use eframe::egui::{Pos2, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points};

use crate::state::{AppState, MapPoint};

// ---------------------------------------------------------------------------
// World map (bubble scatter over longitude × latitude)
// ---------------------------------------------------------------------------

const MAP_HEIGHT: f32 = 350.0;

/// Render the world map; hovering a bubble selects its region.
///
/// Bubbles are drawn locally over longitude × latitude. There is no basemap
/// tile layer, so no access token or network request is involved.
pub fn world_map(ui: &mut Ui, state: &mut AppState) {
    if state.map.is_empty() {
        ui.allocate_ui([ui.available_width(), MAP_HEIGHT].into(), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("No data loaded  (File → Open folder… or Reload)");
            });
        });
        return;
    }

    let response = Plot::new("world_map")
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-60.0)
        .include_y(85.0)
        .show_grid(false)
        .show_axes(false)
        .allow_scroll(false)
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\nlat {:.2}, long {:.2}", value.y, value.x)
            }
        })
        .show(ui, |plot_ui| {
            for point in &state.map {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[point.long, point.lat]]))
                        .name(format!("{}: {:.0} confirmed", point.region, point.confirmed))
                        .radius(point.radius)
                        .color(point.color.gamma_multiply(0.8))
                        .filled(true),
                );
            }

            let pointer = plot_ui.pointer_coordinate()?;
            let pointer = plot_ui.screen_from_plot(pointer);
            hovered_bubble(&state.map, pointer, |p| {
                plot_ui.screen_from_plot(PlotPoint::new(p.long, p.lat))
            })
            .map(|p| p.region.clone())
        });

    if let Some(region) = response.inner {
        state.set_hovered_region(&region);
    }
}

/// Bubble under `pointer`, preferring the closest centre when bubbles overlap.
fn hovered_bubble<'a>(
    points: &'a [MapPoint],
    pointer: Pos2,
    to_screen: impl Fn(&MapPoint) -> Pos2,
) -> Option<&'a MapPoint> {
    points
        .iter()
        .filter_map(|p| {
            let distance = to_screen(p).distance(pointer);
            (distance <= p.radius.max(4.0)).then_some((p, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}
