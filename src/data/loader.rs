use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::model::{Dataset, SeriesKind, TimeSeriesRow, TimeSeriesTable};

/// Raw GitHub path of the CSSE global time series.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/";

const ID_COLUMNS: [&str; 4] = ["Province/State", "Country/Region", "Lat", "Long"];

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the three time-series CSVs come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// Directory URL; the series file names are appended to it.
    Remote { base_url: String },
    /// Local directory holding the three CSV files.
    Local { dir: PathBuf },
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Remote {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DataSource {
    /// URL or path of one series, for logs and error messages.
    pub fn location(&self, kind: SeriesKind) -> String {
        match self {
            DataSource::Remote { base_url } => join_url(base_url, kind.file_name()),
            DataSource::Local { dir } => dir.join(kind.file_name()).display().to_string(),
        }
    }
}

fn join_url(base: &str, file: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{file}")
    } else {
        format!("{base}/{file}")
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load all three series. No retry: the first failure is returned.
pub fn load_dataset(source: &DataSource) -> Result<Dataset> {
    let confirmed = fetch_series(source, SeriesKind::Confirmed)?;
    let recovered = fetch_series(source, SeriesKind::Recovered)?;
    let dead = fetch_series(source, SeriesKind::Dead)?;

    log::info!(
        "Loaded {} confirmed, {} recovered, {} dead rows ({} dates)",
        confirmed.len(),
        recovered.len(),
        dead.len(),
        confirmed.dates.len()
    );

    Ok(Dataset {
        confirmed,
        recovered,
        dead,
    })
}

/// Fetch and parse a single series.
pub fn fetch_series(source: &DataSource, kind: SeriesKind) -> Result<TimeSeriesTable> {
    let location = source.location(kind);
    log::info!("Loading {kind} from {location}");

    let table = match source {
        DataSource::Remote { .. } => {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .context("building HTTP client")?;
            let body = client
                .get(&location)
                .send()
                .and_then(|resp| resp.error_for_status())
                .with_context(|| format!("downloading {location}"))?
                .text()
                .with_context(|| format!("reading body of {location}"))?;
            parse_time_series(body.as_bytes())
        }
        DataSource::Local { .. } => {
            let file = std::fs::File::open(&location)
                .with_context(|| format!("opening {location}"))?;
            parse_time_series(file)
        }
    };

    let table = table.with_context(|| format!("parsing {kind} series from {location}"))?;
    if table.is_empty() {
        log::warn!("{kind} series from {location} has no rows");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSSE layout: `Province/State,Country/Region,Lat,Long,<date>,<date>,...`
/// with one cumulative count per date column.
pub fn parse_time_series<R: Read>(reader: R) -> Result<TimeSeriesTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.len() <= ID_COLUMNS.len() {
        bail!(
            "expected {} identifier columns and at least one date column, got {} columns",
            ID_COLUMNS.len(),
            headers.len()
        );
    }
    for (i, expected) in ID_COLUMNS.iter().enumerate() {
        if headers[i] != *expected {
            bail!("column {i} is '{}', expected '{expected}'", headers[i]);
        }
    }

    let dates = headers[ID_COLUMNS.len()..].to_vec();
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let province = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let country = record.get(1).unwrap_or("").trim().to_string();
        let lat = parse_number(record.get(2).unwrap_or(""), row_no, "Lat")?;
        let long = parse_number(record.get(3).unwrap_or(""), row_no, "Long")?;

        let values = dates
            .iter()
            .enumerate()
            .map(|(j, date)| {
                parse_number(record.get(ID_COLUMNS.len() + j).unwrap_or(""), row_no, date)
            })
            .collect::<Result<Vec<f64>>>()?;

        rows.push(TimeSeriesRow {
            province,
            country,
            lat,
            long,
            values,
        });
    }

    Ok(TimeSeriesTable { dates, rows })
}

/// Blank cells are missing values (NaN), anything else must be numeric.
fn parse_number(s: &str, row: usize, col: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{s}' is not a number"))
}
