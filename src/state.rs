use crate::color::ice_fire_for;
use crate::config::Config;
use crate::data::loader::DataSource;
use crate::data::model::{Dataset, LongTable, MainRow, MainTable, SeriesKind};
use crate::data::reshape::{WorldTotals, create_main_table, melt, region_series};
use crate::data::table::{
    SortBy, SortDirection, TableColumn, TableQuery, page_count, update_table,
};

use eframe::egui::Color32;

/// Diameter in pixels of the largest map bubble.
pub const SIZE_MAX: f32 = 70.0;

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// One bubble of the world map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub region: String,
    pub lat: f64,
    pub long: f64,
    pub confirmed: f64,
    /// Bubble radius in pixels; area scales with the confirmed count.
    pub radius: f32,
    pub color: Color32,
}

/// Time series of the hovered region, one line per series kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountrySeries {
    pub region: String,
    /// Date labels, indexed by the x coordinate of the lines.
    pub dates: Vec<String>,
    pub lines: Vec<(SeriesKind, Vec<[f64; 2]>)>,
}

/// Stacked bars for the rows currently shown by the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackedBars {
    pub regions: Vec<String>,
    /// Bar heights per kind, stacked in this order.
    pub series: Vec<(SeriesKind, Vec<f64>)>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Inputs are changed through the `set_*` methods, each of which recomputes
/// only the views that depend on that input.
pub struct AppState {
    /// Where the data was (or will be) loaded from.
    pub source: DataSource,

    /// Raw series (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Latest counts and ratios, one row per region.
    pub main_table: MainTable,

    /// Melted series, one table per kind.
    pub confirmed_ts: LongTable,
    pub recovered_ts: LongTable,
    pub dead_ts: LongTable,

    /// Summary cards.
    pub totals: WorldTotals,

    /// Year selected in the dropdown.
    pub year: String,

    /// Cached world map bubbles.
    pub map: Vec<MapPoint>,

    /// Region whose time series is shown.
    pub hovered_region: String,

    /// Cached time series of `hovered_region`.
    pub country_series: CountrySeries,

    /// Paging / sorting / filtering of the table.
    pub table_query: TableQuery,

    /// Text currently typed in the filter box (applied on enter).
    pub filter_input: String,

    /// Rows of the current table page.
    pub page_rows: Vec<MainRow>,

    /// Rows matching the filter, across all pages.
    pub matching_rows: usize,

    /// Cached bar chart of `page_rows`.
    pub bar_chart: StackedBars,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let table_query = TableQuery {
            page_size: config.page_size,
            ..TableQuery::default()
        };
        Self {
            source: config.data_source.clone(),
            dataset: None,
            main_table: MainTable::new(),
            confirmed_ts: LongTable::new(),
            recovered_ts: LongTable::new(),
            dead_ts: LongTable::new(),
            totals: WorldTotals::default(),
            year: config.year.clone(),
            map: Vec::new(),
            hovered_region: config.default_region.clone(),
            country_series: CountrySeries::default(),
            table_query,
            filter_input: String::new(),
            page_rows: Vec::new(),
            matching_rows: 0,
            bar_chart: StackedBars::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and rebuild every derived view.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.main_table = create_main_table(&dataset.confirmed, &dataset.recovered, &dataset.dead);
        self.confirmed_ts = melt(&dataset.confirmed, SeriesKind::Confirmed);
        self.recovered_ts = melt(&dataset.recovered, SeriesKind::Recovered);
        self.dead_ts = melt(&dataset.dead, SeriesKind::Dead);
        self.totals = WorldTotals::from_main(&self.main_table);
        self.dataset = Some(dataset);
        self.status_message = None;

        self.rebuild_map();
        self.rebuild_country_series();
        self.apply_table_query(self.table_query.clone());
    }

    /// Record a load failure without discarding what is already shown.
    pub fn set_load_error(&mut self, error: &anyhow::Error) {
        self.status_message = Some(format!("Error: {error:#}"));
    }

    // -- world map --

    /// Year dropdown changed: redraw the map.
    pub fn set_year(&mut self, year: &str) {
        if self.year != year {
            self.year = year.to_string();
            self.rebuild_map();
        }
    }

    fn rebuild_map(&mut self) {
        let located = self
            .main_table
            .iter()
            .filter(|r| !r.lat.is_nan() && !r.long.is_nan());

        let (min, max) = located
            .clone()
            .map(|r| r.confirmed)
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        self.map = located
            .map(|r| MapPoint {
                region: r.region.clone(),
                lat: r.lat,
                long: r.long,
                confirmed: r.confirmed,
                radius: bubble_radius(r.confirmed, max),
                color: ice_fire_for(r.confirmed, min, max),
            })
            .collect();
        log::debug!("Map for {} rebuilt with {} bubbles", self.year, self.map.len());
    }

    // -- country time series --

    /// Map hover moved onto a bubble.
    pub fn set_hovered_region(&mut self, region: &str) {
        if self.hovered_region != region {
            self.hovered_region = region.to_string();
            self.rebuild_country_series();
        }
    }

    fn rebuild_country_series(&mut self) {
        let rows = region_series(
            &[&self.confirmed_ts, &self.recovered_ts, &self.dead_ts],
            &self.hovered_region,
        );

        let mut series = CountrySeries {
            region: self.hovered_region.clone(),
            ..CountrySeries::default()
        };
        for kind in SeriesKind::ALL {
            let points: Vec<[f64; 2]> = rows
                .iter()
                .filter(|r| r.kind == kind)
                .enumerate()
                .map(|(i, r)| [i as f64, r.value])
                .collect();
            if points.is_empty() {
                continue;
            }
            if series.dates.is_empty() {
                series.dates = rows
                    .iter()
                    .filter(|r| r.kind == kind)
                    .map(|r| r.date.clone())
                    .collect();
            }
            series.lines.push((kind, points));
        }
        if series.lines.is_empty() && self.dataset.is_some() {
            log::debug!("No time series for region '{}'", self.hovered_region);
        }
        self.country_series = series;
    }

    // -- data table --

    /// Apply a new filter query and jump back to the first page.
    pub fn set_filter_query(&mut self, query: &str) {
        let candidate = TableQuery {
            filter_query: query.to_string(),
            page_current: 0,
            ..self.table_query.clone()
        };
        self.apply_table_query(candidate);
    }

    /// Header click: ascending → descending → unsorted.
    pub fn toggle_sort(&mut self, column: TableColumn) {
        let mut candidate = self.table_query.clone();
        let sort_by = &mut candidate.sort_by;
        match sort_by.iter().position(|s| s.column == column) {
            Some(i) if sort_by[i].direction == SortDirection::Asc => {
                sort_by[i].direction = SortDirection::Desc;
            }
            Some(i) => {
                sort_by.remove(i);
            }
            None => sort_by.push(SortBy {
                column,
                direction: SortDirection::Asc,
            }),
        }
        self.apply_table_query(candidate);
    }

    pub fn sort_direction(&self, column: TableColumn) -> Option<SortDirection> {
        self.table_query
            .sort_by
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.direction)
    }

    pub fn set_page(&mut self, page: usize) {
        let last = self.page_count().saturating_sub(1);
        let candidate = TableQuery {
            page_current: page.min(last),
            ..self.table_query.clone()
        };
        self.apply_table_query(candidate);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let candidate = TableQuery {
            page_size: page_size.max(1),
            page_current: 0,
            ..self.table_query.clone()
        };
        self.apply_table_query(candidate);
    }

    pub fn page_count(&self) -> usize {
        page_count(self.matching_rows, self.table_query.page_size)
    }

    /// Remove a row from the displayed page only; the next table refresh restores it.
    pub fn delete_row(&mut self, index: usize) {
        if index < self.page_rows.len() {
            let row = self.page_rows.remove(index);
            log::debug!("Removed '{}' from the current page", row.region);
            self.rebuild_bar_chart();
        }
    }

    /// Run `candidate` and commit it with its page only if it evaluates.
    /// A rejected query leaves the table, its query and the bars as they were.
    fn apply_table_query(&mut self, candidate: TableQuery) {
        match update_table(&self.main_table, &candidate) {
            Ok(page) => {
                self.table_query = candidate;
                self.matching_rows = page.matching;
                self.page_rows = page.rows;
                if self.status_message.as_deref().is_some_and(|m| m.starts_with("Filter")) {
                    self.status_message = None;
                }
                self.rebuild_bar_chart();
            }
            Err(e) => {
                log::warn!("Filter '{}' rejected: {e}", candidate.filter_query);
                self.status_message = Some(format!("Filter error: {e}"));
            }
        }
    }

    // -- stacked bar chart --

    fn rebuild_bar_chart(&mut self) {
        let rows = &self.page_rows;
        self.bar_chart = StackedBars {
            regions: rows.iter().map(|r| r.region.clone()).collect(),
            series: SeriesKind::ALL
                .into_iter()
                .map(|kind| {
                    let heights = rows
                        .iter()
                        .map(|r| match kind {
                            SeriesKind::Confirmed => r.confirmed,
                            SeriesKind::Recovered => r.recovered,
                            SeriesKind::Dead => r.dead,
                        })
                        .map(|v| if v.is_nan() { 0.0 } else { v })
                        .collect();
                    (kind, heights)
                })
                .collect(),
        };
    }
}

/// Radius such that bubble area is proportional to `value`, capped at [`SIZE_MAX`].
fn bubble_radius(value: f64, max: f64) -> f32 {
    const MIN_RADIUS: f32 = 1.5;
    if value.is_nan() || max <= 0.0 || !max.is_finite() {
        return MIN_RADIUS;
    }
    let radius = (SIZE_MAX / 2.0) * (value.max(0.0) / max).sqrt() as f32;
    radius.max(MIN_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{TimeSeriesRow, TimeSeriesTable};

    fn series(rows: &[(Option<&str>, &str, f64, [f64; 2])]) -> TimeSeriesTable {
        TimeSeriesTable {
            dates: vec!["3/1/20".into(), "3/2/20".into()],
            rows: rows
                .iter()
                .map(|(province, country, lat, values)| TimeSeriesRow {
                    province: province.map(str::to_string),
                    country: country.to_string(),
                    lat: *lat,
                    long: 10.0,
                    values: values.to_vec(),
                })
                .collect(),
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            confirmed: series(&[
                (None, "US", 40.0, [10.0, 400.0]),
                (None, "Italy", 43.0, [5.0, 100.0]),
                (Some("Hubei"), "China", f64::NAN, [50.0, 80.0]),
            ]),
            recovered: series(&[
                (None, "US", 40.0, [0.0, 40.0]),
                (None, "Italy", 43.0, [0.0, 20.0]),
                (Some("Hubei"), "China", f64::NAN, [5.0, 60.0]),
            ]),
            dead: series(&[
                (None, "US", 40.0, [0.0, 8.0]),
                (None, "Italy", 43.0, [1.0, 10.0]),
                (Some("Hubei"), "China", f64::NAN, [1.0, 3.0]),
            ]),
        }
    }

    fn loaded(page_size: usize) -> AppState {
        let config = Config {
            page_size,
            ..Config::default()
        };
        let mut state = AppState::new(&config);
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn dataset_populates_every_view() {
        let state = loaded(7);
        assert_eq!(state.main_table.len(), 3);
        assert_eq!(state.confirmed_ts.len(), 6);
        assert_eq!(state.totals.confirmed, 580.0);
        assert_eq!(state.page_rows.len(), 3);
        assert_eq!(state.bar_chart.regions, vec!["US", "Italy", "Hubei"]);
        // Hubei has no coordinates and is left off the map.
        assert_eq!(state.map.len(), 2);
    }

    #[test]
    fn default_hover_shows_us() {
        let state = loaded(7);
        assert_eq!(state.country_series.region, "US");
        assert_eq!(state.country_series.dates, vec!["3/1/20", "3/2/20"]);
        let kinds: Vec<SeriesKind> = state.country_series.lines.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, SeriesKind::ALL.to_vec());
        assert_eq!(state.country_series.lines[0].1, vec![[0.0, 10.0], [1.0, 400.0]]);
    }

    #[test]
    fn hover_switches_region_and_tolerates_unknown() {
        let mut state = loaded(7);
        state.set_hovered_region("Hubei");
        assert_eq!(state.country_series.lines[2].1, vec![[0.0, 1.0], [1.0, 3.0]]);

        state.set_hovered_region("Atlantis");
        assert!(state.country_series.lines.is_empty());
        assert_eq!(state.country_series.region, "Atlantis");
    }

    #[test]
    fn biggest_bubble_hits_size_max() {
        let state = loaded(7);
        let us = state.map.iter().find(|p| p.region == "US").unwrap();
        let italy = state.map.iter().find(|p| p.region == "Italy").unwrap();
        assert_eq!(us.radius, SIZE_MAX / 2.0);
        assert!((italy.radius - SIZE_MAX / 4.0).abs() < 1e-4);
    }

    #[test]
    fn filter_drives_page_and_bars() {
        let mut state = loaded(7);
        state.set_filter_query("{Confirmed} > 90");
        assert_eq!(state.matching_rows, 2);
        assert_eq!(state.bar_chart.regions, vec!["US", "Italy"]);
        assert_eq!(state.bar_chart.series[2], (SeriesKind::Dead, vec![8.0, 10.0]));
    }

    #[test]
    fn bad_filter_keeps_previous_rows() {
        let mut state = loaded(7);
        state.set_filter_query("{Lat} > 3");
        assert_eq!(state.page_rows.len(), 3);
        assert!(state.status_message.as_deref().unwrap().contains("unknown column 'Lat'"));

        state.set_filter_query("");
        assert!(state.status_message.is_none());
    }

    #[test]
    fn rejected_filter_leaves_query_untouched() {
        let mut state = loaded(2);
        state.toggle_sort(TableColumn::Confirmed);
        state.set_page(1);
        let before = state.table_query.clone();
        let rows_before = state.page_rows.clone();
        assert_eq!(state.bar_chart.regions, vec!["US"]);

        state.set_filter_query("{Lat} > 3");
        assert_eq!(state.table_query, before);
        assert_eq!(state.table_query.page_current, 1);
        assert_eq!(state.page_rows, rows_before);
        assert!(state.status_message.is_some());

        // Later inputs act on the last accepted query, not the rejected one.
        state.toggle_sort(TableColumn::Confirmed);
        assert_eq!(
            state.sort_direction(TableColumn::Confirmed),
            Some(SortDirection::Desc)
        );
        assert!(state.table_query.filter_query.is_empty());
        assert_eq!(state.bar_chart.regions, vec!["Hubei"]);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn sort_cycles_through_directions() {
        let mut state = loaded(7);
        state.toggle_sort(TableColumn::Dead);
        assert_eq!(state.sort_direction(TableColumn::Dead), Some(SortDirection::Asc));
        assert_eq!(state.page_rows[0].region, "Hubei");

        state.toggle_sort(TableColumn::Dead);
        assert_eq!(state.sort_direction(TableColumn::Dead), Some(SortDirection::Desc));
        assert_eq!(state.page_rows[0].region, "Italy");

        state.toggle_sort(TableColumn::Dead);
        assert_eq!(state.sort_direction(TableColumn::Dead), None);
        assert_eq!(state.page_rows[0].region, "US");
    }

    #[test]
    fn paging_is_clamped_to_last_page() {
        let mut state = loaded(2);
        assert_eq!(state.page_count(), 2);
        state.set_page(5);
        assert_eq!(state.table_query.page_current, 1);
        assert_eq!(state.bar_chart.regions, vec!["Hubei"]);
    }

    #[test]
    fn deleting_a_row_only_touches_the_page() {
        let mut state = loaded(7);
        state.delete_row(0);
        assert_eq!(state.bar_chart.regions, vec!["Italy", "Hubei"]);
        assert_eq!(state.main_table.len(), 3);

        state.delete_row(10);
        assert_eq!(state.page_rows.len(), 2);

        state.set_page(0);
        assert_eq!(state.page_rows.len(), 3);
    }

    #[test]
    fn year_change_rebuilds_map() {
        let mut state = loaded(7);
        state.map.clear();
        state.set_year("2020");
        assert!(state.map.is_empty());
        state.year = "2019".into();
        state.set_year("2020");
        assert_eq!(state.map.len(), 2);
    }
}
