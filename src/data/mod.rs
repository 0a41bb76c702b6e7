/// Data layer: World Bank tables, the in-memory dataset, row filtering.
///
/// Architecture:
/// ```text
///  API_*.csv   Metadata_Country_API_*.csv
///        │              │
///        ▼              ▼
///   ┌──────────────────────┐
///   │        loader         │  locate header, split lines, parse cells
///   └──────────────────────┘
///        │        ▲
///        │        │
///        │   ┌──────────┐
///        │   │  filter   │  country-code / year-column / value rules
///        │   └──────────┘
///        ▼
///   ┌──────────┐
///   │  Dataset  │  code → values by year, metadata, year set
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
