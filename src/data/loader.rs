use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use thiserror::Error;

use crate::config::DataPaths;

use super::filter::{accepts_country_code, parse_value, year_column};
use super::model::{CountryMetadata, CountryRecord, Dataset, MetadataTable};

/// First cell of the value table's real header row.
pub const HEADER_SENTINEL: &str = "Country Name";

const NAME_COLUMN: usize = 0;
const CODE_COLUMN: usize = 1;

const META_CODE_COLUMN: usize = 0;
const META_REGION_COLUMN: usize = 1;
const META_INCOME_COLUMN: usize = 2;
const META_TABLE_NAME_COLUMN: usize = 4;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Load-phase failures. Any of these ends the session before it becomes interactive.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no country rows found in '{}'", path.display())]
    NoCountries { path: PathBuf },
    #[error("the background loader stopped before reporting a result")]
    WorkerLost,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read both tables (concurrently) and merge them.
pub fn load_tables(values_path: &Path, metadata_path: &Path) -> Result<Dataset, LoadError> {
    let (values_text, metadata_text) = thread::scope(|s| {
        let metadata = s.spawn(|| read_table(metadata_path));
        let values = read_table(values_path);
        let metadata = metadata.join().unwrap_or(Err(LoadError::WorkerLost));
        (values, metadata)
    });

    let values = parse_value_table(&values_text?);
    if values.is_empty() {
        return Err(LoadError::NoCountries {
            path: values_path.to_path_buf(),
        });
    }
    let metadata = parse_metadata_table(&metadata_text?);

    let dataset = build(values, metadata);
    log::info!(
        "Loaded {} countries, {} years, {} metadata entries",
        dataset.len(),
        dataset.years.len(),
        dataset.metadata.len()
    );
    Ok(dataset)
}

/// Result of a background load: the dataset plus raw country outlines, if configured.
#[derive(Debug)]
pub struct LoadedTables {
    pub dataset: Dataset,
    pub boundaries: Option<String>,
}

/// Load on a worker thread; the receiver yields exactly one result.
pub fn spawn_load(paths: DataPaths) -> Receiver<Result<LoadedTables, LoadError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_tables(&paths.values, &paths.metadata).map(|dataset| LoadedTables {
            dataset,
            boundaries: paths.boundaries.as_deref().and_then(read_boundaries),
        });
        if tx.send(result).is_err() {
            log::debug!("Load finished after the receiver was dropped");
        }
    });
    rx
}

/// Outlines are optional: a read failure only costs the labels.
fn read_boundaries(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Skipping country outlines '{}': {e}", path.display());
            None
        }
    }
}

fn read_table(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge the value dataset with the metadata table.
pub fn build(values: Dataset, metadata: MetadataTable) -> Dataset {
    values.with_metadata(metadata)
}

// ---------------------------------------------------------------------------
// Value table
// ---------------------------------------------------------------------------

/// World Bank wide layout:
///
/// ```text
/// "Data Source","World Development Indicators",
/// "Last Updated Date","2024-06-28",
///
/// "Country Name","Country Code","Indicator Name","Indicator Code","1960",...,"2023",
/// "Aruba","ABW","GDP (current US$)","NY.GDP.MKTP.CD","","",...,"3544707788.77",
/// ```
///
/// Preamble lines before the sentinel header are skipped. A table without the
/// sentinel header yields an empty dataset and a warning.
pub fn parse_value_table(text: &str) -> Dataset {
    let lines: Vec<&str> = text.lines().collect();

    let Some(header_index) = lines
        .iter()
        .position(|line| split_line(line).first().map(String::as_str) == Some(HEADER_SENTINEL))
    else {
        log::warn!("Value table has no '{HEADER_SENTINEL}' header row; no data loaded");
        return Dataset::default();
    };

    let year_columns: Vec<(i32, usize)> = split_line(lines[header_index])
        .iter()
        .enumerate()
        .filter_map(|(i, header)| year_column(i, header).map(|year| (year, i)))
        .collect();

    let mut records = Vec::new();
    for line in &lines[header_index + 1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_line(line);
        if fields.len() <= CODE_COLUMN {
            continue;
        }

        let code = &fields[CODE_COLUMN];
        if !accepts_country_code(code) {
            log::debug!("Skipping row with code {code:?}");
            continue;
        }

        let values = year_columns
            .iter()
            .filter_map(|&(year, column)| {
                let value = parse_value(fields.get(column)?)?;
                Some((year, value))
            })
            .collect();

        records.push(CountryRecord {
            code: code.clone(),
            name: fields[NAME_COLUMN].clone(),
            values,
        });
    }

    Dataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Metadata table
// ---------------------------------------------------------------------------

/// Columns: `Country Code, Region, IncomeGroup, SpecialNotes, TableName`.
/// Row 0 is always the header.
pub fn parse_metadata_table(text: &str) -> MetadataTable {
    let mut table = MetadataTable::new();

    for line in text.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_line(line);
        let Some(code) = fields.get(META_CODE_COLUMN).filter(|c| !c.is_empty()) else {
            continue;
        };

        let cell = |i: usize| {
            fields
                .get(i)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        table.insert(
            code.clone(),
            CountryMetadata {
                region: cell(META_REGION_COLUMN),
                income_group: cell(META_INCOME_COLUMN),
                display_name: cell(META_TABLE_NAME_COLUMN),
            },
        );
    }

    table
}

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// Split one line on commas, honouring quoted spans.
///
/// Every `"` toggles the quoted state and is dropped, so a comma inside quotes
/// is literal. Doubled quotes (`""`) are not unescaped; they simply toggle twice.
pub fn split_line(line: &str) -> Vec<String> {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
