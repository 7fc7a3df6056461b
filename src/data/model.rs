use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// SeriesKind – which of the three JHU time series a table holds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKind {
    Confirmed,
    Recovered,
    Dead,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [
        SeriesKind::Confirmed,
        SeriesKind::Recovered,
        SeriesKind::Dead,
    ];

    /// Label used for the `type` column of the long table and the chart legend.
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Confirmed => "Confirmed Cases",
            SeriesKind::Recovered => "Recovered Cases",
            SeriesKind::Dead => "Death Cases",
        }
    }

    /// Short name used for table columns and bar chart series.
    pub fn short_name(self) -> &'static str {
        match self {
            SeriesKind::Confirmed => "Confirmed",
            SeriesKind::Recovered => "Recovered",
            SeriesKind::Dead => "Dead",
        }
    }

    /// File name of the series in the CSSE time-series directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SeriesKind::Confirmed => "time_series_covid19_confirmed_global.csv",
            SeriesKind::Recovered => "time_series_covid19_recovered_global.csv",
            SeriesKind::Dead => "time_series_covid19_deaths_global.csv",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single table cell as seen by filtering and sorting
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dataframe dtypes the table uses.
/// NaN numbers are normalised to `Null` so ordering stays total.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

impl CellValue {
    pub fn number(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Number(v)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// -- Manual Eq/Ord so rows can be sorted by any column --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Number(_) => 0,
                Text(_) => 1,
                Null => 2,
            }
        }
        match (self, other) {
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeSeriesTable – one wide CSSE CSV
// ---------------------------------------------------------------------------

/// One row of a wide time-series CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRow {
    /// Province/State, `None` when the cell was blank.
    pub province: Option<String>,
    pub country: String,
    /// Latitude, NaN when missing.
    pub lat: f64,
    /// Longitude, NaN when missing.
    pub long: f64,
    /// One cumulative count per entry in [`TimeSeriesTable::dates`].
    pub values: Vec<f64>,
}

impl TimeSeriesRow {
    /// Province/State, falling back to Country/Region when blank.
    pub fn region(&self) -> &str {
        self.province.as_deref().unwrap_or(&self.country)
    }
}

/// A wide table: identifier columns followed by one column per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    /// Date column headers in file order (e.g. `"1/22/20"`).
    pub dates: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The three raw series as loaded from the data source.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub confirmed: TimeSeriesTable,
    pub recovered: TimeSeriesTable,
    pub dead: TimeSeriesTable,
}

// ---------------------------------------------------------------------------
// Derived tables
// ---------------------------------------------------------------------------

/// One row of the main table: latest counts plus ratio columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MainRow {
    pub region: String,
    pub lat: f64,
    pub long: f64,
    pub confirmed: f64,
    pub recovered: f64,
    pub dead: f64,
    pub recovered_ratio: f64,
    pub dead_ratio: f64,
}

pub type MainTable = Vec<MainRow>;

/// One (region, date) observation of the melted table.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    /// Province/State filled with Country/Region.
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub long: f64,
    pub date: String,
    pub value: f64,
    pub kind: SeriesKind,
}

pub type LongTable = Vec<LongRow>;
