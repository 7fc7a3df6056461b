use std::collections::HashMap;

use super::model::{LongRow, LongTable, MainRow, MainTable, SeriesKind, TimeSeriesTable};

// ---------------------------------------------------------------------------
// Latest column
// ---------------------------------------------------------------------------

/// Header of the most recent date column.
pub fn last_column(table: &TimeSeriesTable) -> Option<&str> {
    table.dates.last().map(String::as_str)
}

/// Value of the most recent date column for each row (NaN if the table has no dates).
fn latest_values(table: &TimeSeriesTable) -> impl Iterator<Item = f64> + '_ {
    table
        .rows
        .iter()
        .map(|row| row.values.last().copied().unwrap_or(f64::NAN))
}

/// Latest value keyed by (Country/Region, Province/State).
fn latest_by_key(table: &TimeSeriesTable) -> HashMap<(&str, Option<&str>), f64> {
    let mut map = HashMap::with_capacity(table.len());
    for (row, value) in table.rows.iter().zip(latest_values(table)) {
        // Keep the first occurrence of a duplicated key.
        map.entry((row.country.as_str(), row.province.as_deref()))
            .or_insert(value);
    }
    map
}

/// `round(numerator / denominator, 2)` with ties to even, NaN when the ratio is undefined.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || numerator.is_nan() || denominator.is_nan() {
        return f64::NAN;
    }
    (numerator / denominator * 100.0).round_ties_even() / 100.0
}

// ---------------------------------------------------------------------------
// Main table
// ---------------------------------------------------------------------------

/// Collapse each series to its latest column and add the two ratio columns.
///
/// Rows follow the confirmed table. Recovered and dead counts are joined on
/// (Country/Region, Province/State); unmatched keys yield NaN.
pub fn create_main_table(
    confirmed: &TimeSeriesTable,
    recovered: &TimeSeriesTable,
    dead: &TimeSeriesTable,
) -> MainTable {
    let recovered_by_key = latest_by_key(recovered);
    let dead_by_key = latest_by_key(dead);

    confirmed
        .rows
        .iter()
        .zip(latest_values(confirmed))
        .map(|(row, confirmed_count)| {
            let key = (row.country.as_str(), row.province.as_deref());
            let recovered_count = recovered_by_key.get(&key).copied().unwrap_or(f64::NAN);
            let dead_count = dead_by_key.get(&key).copied().unwrap_or(f64::NAN);

            MainRow {
                region: row.region().to_string(),
                lat: row.lat,
                long: row.long,
                confirmed: confirmed_count,
                recovered: recovered_count,
                dead: dead_count,
                recovered_ratio: ratio(recovered_count, confirmed_count),
                dead_ratio: ratio(dead_count, confirmed_count),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Melt
// ---------------------------------------------------------------------------

/// Unpivot the date columns into one (Date, Value) row per region and date.
pub fn melt(table: &TimeSeriesTable, kind: SeriesKind) -> LongTable {
    let mut out = Vec::with_capacity(table.len() * table.dates.len());
    for row in &table.rows {
        let region = row.region();
        for (date, value) in table.dates.iter().zip(&row.values) {
            out.push(LongRow {
                region: region.to_string(),
                country: row.country.clone(),
                lat: row.lat,
                long: row.long,
                date: date.clone(),
                value: *value,
                kind,
            });
        }
    }
    out
}

/// All observations of one region across the given long tables, in table order.
pub fn region_series<'a>(tables: &[&'a LongTable], region: &str) -> Vec<&'a LongRow> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .filter(|row| row.region == region)
        .collect()
}

// ---------------------------------------------------------------------------
// World totals (summary cards)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldTotals {
    pub confirmed: f64,
    pub recovered: f64,
    pub dead: f64,
}

impl WorldTotals {
    /// Column sums, skipping missing values.
    pub fn from_main(main: &[MainRow]) -> Self {
        fn sum(values: impl Iterator<Item = f64>) -> f64 {
            values.filter(|v| !v.is_nan()).sum()
        }
        WorldTotals {
            confirmed: sum(main.iter().map(|r| r.confirmed)),
            recovered: sum(main.iter().map(|r| r.recovered)),
            dead: sum(main.iter().map(|r| r.dead)),
        }
    }

    pub fn get(&self, kind: SeriesKind) -> f64 {
        match kind {
            SeriesKind::Confirmed => self.confirmed,
            SeriesKind::Recovered => self.recovered,
            SeriesKind::Dead => self.dead,
        }
    }
}

/// Card text: the total with two decimals.
pub fn format_total(total: f64) -> String {
    format!("{:.2}", total.round())
}
