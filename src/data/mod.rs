/// Data layer: core types, loading, reshaping, and table queries.
///
/// Architecture:
/// ```text
///  CSSE CSVs (remote or local dir)
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse each file → TimeSeriesTable (wide)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reshape  │  latest column + ratios → MainTable
///   └──────────┘  melt dates → LongTable per series
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  table   │ ◄── │  filter  │  `{col} op value && ...` queries
///   └──────────┘     └──────────┘
///     filter → sort → page
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod reshape;
pub mod table;
