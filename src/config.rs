use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use palette::Srgb;

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Value table shipped with the World Bank "GDP (current US$)" download.
pub const VALUE_TABLE_PATH: &str =
    "data/API_NY.GDP.MKTP.CD_DS2_en_csv_v2_76261/API_NY.GDP.MKTP.CD_DS2_en_csv_v2_76261.csv";

/// Country metadata table from the same download.
pub const METADATA_TABLE_PATH: &str =
    "data/API_NY.GDP.MKTP.CD_DS2_en_csv_v2_76261/Metadata_Country_API_NY.GDP.MKTP.CD_DS2_en_csv_v2_76261.csv";

/// Prefix the World Bank puts in front of the value file name for the metadata file.
pub const METADATA_FILE_PREFIX: &str = "Metadata_Country_";

pub const VALUES_ENV: &str = "GDP_MAP_VALUES";
pub const METADATA_ENV: &str = "GDP_MAP_METADATA";
pub const BOUNDARIES_ENV: &str = "GDP_MAP_BOUNDARIES";

/// Where the two source tables (and optional country outlines) live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub values: PathBuf,
    pub metadata: PathBuf,
    /// GeoJSON feature collection keyed by `iso_3166_1_alpha_3`.
    pub boundaries: Option<PathBuf>,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            values: PathBuf::from(VALUE_TABLE_PATH),
            metadata: PathBuf::from(METADATA_TABLE_PATH),
            boundaries: None,
        }
    }
}

impl DataPaths {
    /// Defaults, overridden by `GDP_MAP_VALUES` / `GDP_MAP_METADATA` / `GDP_MAP_BOUNDARIES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            values: std::env::var_os(VALUES_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.values),
            metadata: std::env::var_os(METADATA_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.metadata),
            boundaries: std::env::var_os(BOUNDARIES_ENV).map(PathBuf::from),
        }
    }

    /// Pair a user-picked value table with its `Metadata_Country_` sibling.
    pub fn for_value_table(values: &Path) -> Self {
        let file_name = values
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = values.with_file_name(format!("{METADATA_FILE_PREFIX}{file_name}"));
        Self {
            values: values.to_path_buf(),
            metadata,
            boundaries: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

pub const DEFAULT_YEAR: i32 = 2022;

const fn rgb(red: u8, green: u8, blue: u8) -> Srgb<u8> {
    Srgb::<u8>::new(red, green, blue)
}

/// Sequential blues, light to dark.
pub const COLOR_STOPS: [Srgb<u8>; 9] = [
    rgb(0xf7, 0xfb, 0xff),
    rgb(0xde, 0xeb, 0xf7),
    rgb(0xc6, 0xdb, 0xef),
    rgb(0x9e, 0xca, 0xe1),
    rgb(0x6b, 0xae, 0xd6),
    rgb(0x42, 0x92, 0xc6),
    rgb(0x21, 0x71, 0xb5),
    rgb(0x08, 0x51, 0x9c),
    rgb(0x08, 0x30, 0x6b),
];

pub const NO_DATA_COLOR: Srgb<u8> = rgb(0xcc, 0xcc, 0xcc);

/// Extrusion height of a full-scale country at a height scale of 1x, in sink units.
pub const BASE_HEIGHT_UNIT: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Encoding parameter defaults and control ranges
// ---------------------------------------------------------------------------

pub const DEFAULT_HEIGHT_SCALE: f64 = 300.0;
pub const DEFAULT_AMPLIFICATION: f64 = 10.0;
pub const DEFAULT_MIN_HEIGHT_FRACTION: f64 = 0.01;

pub const HEIGHT_SCALE_RANGE: RangeInclusive<f64> = 1.0..=1000.0;
pub const HEIGHT_SCALE_STEP: f64 = 5.0;
pub const AMPLIFICATION_RANGE: RangeInclusive<f64> = 0.5..=50.0;
pub const AMPLIFICATION_STEP: f64 = 0.5;
/// Minimum height as a fraction of full height (the control shows percent).
pub const MIN_HEIGHT_RANGE: RangeInclusive<f64> = 0.0..=0.2;
pub const MIN_HEIGHT_STEP_PERCENT: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_path_follows_world_bank_naming() {
        let paths = DataPaths::for_value_table(Path::new("/tmp/wb/API_X_DS2_en_csv_v2_1.csv"));
        assert_eq!(
            paths.metadata,
            PathBuf::from("/tmp/wb/Metadata_Country_API_X_DS2_en_csv_v2_1.csv")
        );
        assert_eq!(paths.values, PathBuf::from("/tmp/wb/API_X_DS2_en_csv_v2_1.csv"));
    }

    #[test]
    fn default_metadata_path_is_the_sibling_of_the_value_table() {
        let derived = DataPaths::for_value_table(Path::new(VALUE_TABLE_PATH));
        assert_eq!(derived.metadata, PathBuf::from(METADATA_TABLE_PATH));
    }
}
