use std::cmp::Ordering;
use std::fmt;

use super::filter::{FilterError, parse_query};
use super::model::{CellValue, MainRow};

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Columns shown by the data table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableColumn {
    Region,
    Confirmed,
    Recovered,
    Dead,
    RecoveredRatio,
    DeadRatio,
}

impl TableColumn {
    pub const ALL: [TableColumn; 6] = [
        TableColumn::Region,
        TableColumn::Confirmed,
        TableColumn::Recovered,
        TableColumn::Dead,
        TableColumn::RecoveredRatio,
        TableColumn::DeadRatio,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TableColumn::Region => "Country/Region",
            TableColumn::Confirmed => "Confirmed",
            TableColumn::Recovered => "Recovered",
            TableColumn::Dead => "Dead",
            TableColumn::RecoveredRatio => "Recovered/Confirmed",
            TableColumn::DeadRatio => "Dead/Confirmed",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, FilterError> {
        Self::ALL
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| FilterError::UnknownColumn(id.to_string()))
    }

    pub fn value(self, row: &MainRow) -> CellValue {
        match self {
            TableColumn::Region => CellValue::Text(row.region.clone()),
            TableColumn::Confirmed => CellValue::number(row.confirmed),
            TableColumn::Recovered => CellValue::number(row.recovered),
            TableColumn::Dead => CellValue::number(row.dead),
            TableColumn::RecoveredRatio => CellValue::number(row.recovered_ratio),
            TableColumn::DeadRatio => CellValue::number(row.dead_ratio),
        }
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub column: TableColumn,
    pub direction: SortDirection,
}

/// Paging, sorting and filtering inputs of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub page_current: usize,
    pub page_size: usize,
    pub sort_by: Vec<SortBy>,
    pub filter_query: String,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            page_current: 0,
            page_size: 7,
            sort_by: Vec::new(),
            filter_query: String::new(),
        }
    }
}

/// Filter and sort the main table, without paging.
pub fn query_rows(main: &[MainRow], query: &TableQuery) -> Result<Vec<MainRow>, FilterError> {
    let clauses = parse_query(&query.filter_query)?
        .into_iter()
        .map(|clause| {
            let column = TableColumn::from_id(&clause.column)?;
            Ok((column, clause.compile()?))
        })
        .collect::<Result<Vec<_>, FilterError>>()?;

    let mut rows = Vec::new();
    for row in main {
        let mut keep = true;
        for (column, clause) in &clauses {
            if !clause.matches(&column.value(row))? {
                keep = false;
                break;
            }
        }
        if keep {
            rows.push(row.clone());
        }
    }

    if !query.sort_by.is_empty() {
        rows.sort_by(|a, b| compare_rows(a, b, &query.sort_by));
    }
    Ok(rows)
}

/// Multi-column comparison; missing values sort last in either direction.
fn compare_rows(a: &MainRow, b: &MainRow, sort_by: &[SortBy]) -> Ordering {
    for key in sort_by {
        let (va, vb) = (key.column.value(a), key.column.value(b));
        let ordering = match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match key.direction {
                SortDirection::Asc => va.cmp(&vb),
                SortDirection::Desc => vb.cmp(&va),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// One page of the table plus the number of rows matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<MainRow>,
    pub matching: usize,
}

/// Rows of the requested page after filtering and sorting.
pub fn update_table(main: &[MainRow], query: &TableQuery) -> Result<TablePage, FilterError> {
    let rows = query_rows(main, query)?;
    let matching = rows.len();
    let start = query.page_current.saturating_mul(query.page_size);
    Ok(TablePage {
        rows: rows.into_iter().skip(start).take(query.page_size).collect(),
        matching,
    })
}

/// Number of pages needed for `rows` rows (at least one).
pub fn page_count(rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    rows.div_ceil(page_size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(region: &str, confirmed: f64, dead: f64) -> MainRow {
        MainRow {
            region: region.to_string(),
            lat: 0.0,
            long: 0.0,
            confirmed,
            recovered: f64::NAN,
            dead,
            recovered_ratio: f64::NAN,
            dead_ratio: crate::data::reshape::ratio(dead, confirmed),
        }
    }

    fn sample() -> Vec<MainRow> {
        vec![
            row("Italy", 100.0, 10.0),
            row("Chad", 0.0, 0.0),
            row("Peru", 50.0, 5.0),
            row("Malta", 50.0, 1.0),
            row("Oman", 20.0, f64::NAN),
        ]
    }

    fn regions(rows: &[MainRow]) -> Vec<&str> {
        rows.iter().map(|r| r.region.as_str()).collect()
    }

    #[test]
    fn column_ids_round_trip() {
        for column in TableColumn::ALL {
            assert_eq!(TableColumn::from_id(column.id()), Ok(column));
        }
        assert_eq!(
            TableColumn::from_id("Lat"),
            Err(FilterError::UnknownColumn("Lat".into()))
        );
    }

    #[test]
    fn default_query_returns_first_page() {
        let main: Vec<MainRow> = (0..10).map(|i| row(&format!("R{i}"), i as f64, 0.0)).collect();
        let page = update_table(&main, &TableQuery::default()).unwrap().rows;
        assert_eq!(page.len(), 7);
        assert_eq!(page[0].region, "R0");
    }

    #[test]
    fn filters_are_a_conjunction() {
        let query = TableQuery {
            filter_query: "{Confirmed} >= 50 && {Country/Region} contains a".into(),
            ..TableQuery::default()
        };
        let page = update_table(&sample(), &query).unwrap().rows;
        assert_eq!(regions(&page), vec!["Italy", "Malta"]);
    }

    #[test]
    fn multi_sort_with_directions() {
        let query = TableQuery {
            sort_by: vec![
                SortBy {
                    column: TableColumn::Confirmed,
                    direction: SortDirection::Desc,
                },
                SortBy {
                    column: TableColumn::Region,
                    direction: SortDirection::Asc,
                },
            ],
            ..TableQuery::default()
        };
        let page = update_table(&sample(), &query).unwrap().rows;
        assert_eq!(regions(&page), vec!["Italy", "Malta", "Peru", "Oman", "Chad"]);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let query = TableQuery {
                sort_by: vec![SortBy {
                    column: TableColumn::Dead,
                    direction,
                }],
                ..TableQuery::default()
            };
            let page = update_table(&sample(), &query).unwrap().rows;
            assert_eq!(page.last().map(|r| r.region.as_str()), Some("Oman"));
        }
    }

    #[test]
    fn paging_slices_and_runs_out() {
        let query = TableQuery {
            page_current: 1,
            page_size: 2,
            ..TableQuery::default()
        };
        let page = update_table(&sample(), &query).unwrap().rows;
        assert_eq!(regions(&page), vec!["Peru", "Malta"]);

        let query = TableQuery {
            page_current: 9,
            ..query
        };
        let page = update_table(&sample(), &query).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.matching, 5);
    }

    #[test]
    fn unknown_filter_column_is_an_error() {
        let query = TableQuery {
            filter_query: "{Lat} > 3".into(),
            ..TableQuery::default()
        };
        assert_eq!(
            update_table(&sample(), &query).err(),
            Some(FilterError::UnknownColumn("Lat".into()))
        );
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 7), 1);
        assert_eq!(page_count(7, 7), 1);
        assert_eq!(page_count(8, 7), 2);
        assert_eq!(page_count(5, 0), 1);
    }
}
