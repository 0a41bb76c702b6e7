use std::collections::{BTreeMap, BTreeSet};

use crate::format::format_magnitude;

/// Shown in the info panel when a country has no metadata entry or a blank field.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// CountryRecord – one accepted row of the value table
// ---------------------------------------------------------------------------

/// A country and its per-year values. A year missing from `values` means
/// "no data", which is distinct from a value of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    /// ISO-3166 alpha-3 style code, the key across both tables.
    pub code: String,
    pub name: String,
    pub values: BTreeMap<i32, f64>,
}

impl CountryRecord {
    pub fn value(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }
}

// ---------------------------------------------------------------------------
// CountryMetadata – one row of the metadata table
// ---------------------------------------------------------------------------

/// Blank cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryMetadata {
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub display_name: Option<String>,
}

pub type MetadataTable = BTreeMap<String, CountryMetadata>;

// ---------------------------------------------------------------------------
// ValueRange / YearSlice – derived per-year views
// ---------------------------------------------------------------------------

/// `{min, max}` over the defined values of one year; `0..0` when there are none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// The defined values of every country for a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSlice {
    pub year: i32,
    pub values: BTreeMap<String, f64>,
    pub range: ValueRange,
}

impl YearSlice {
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CountryInfo – what the hover panel displays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryInfo {
    pub code: String,
    pub name: String,
    pub year: i32,
    pub formatted_value: String,
    pub region: String,
    pub income_group: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded model
// ---------------------------------------------------------------------------

/// Value records and metadata, indexed by country code. Built once at load
/// time and never mutated afterwards. The two key spaces overlap but neither
/// contains the other; every lookup degrades to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Ascending years that carry at least one defined value.
    pub years: BTreeSet<i32>,
    pub countries: BTreeMap<String, CountryRecord>,
    pub metadata: MetadataTable,
}

impl Dataset {
    /// Index records by code. The first record for a code wins.
    pub fn from_records(records: Vec<CountryRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut countries = BTreeMap::new();

        for record in records {
            if countries.contains_key(&record.code) {
                log::warn!("Duplicate country code {}; keeping the first row", record.code);
                continue;
            }
            years.extend(record.values.keys().copied());
            countries.insert(record.code.clone(), record);
        }

        Dataset {
            years,
            countries,
            metadata: MetadataTable::new(),
        }
    }

    /// Attach a metadata table. Codes need not match the value table.
    pub fn with_metadata(mut self, metadata: MetadataTable) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn country(&self, code: &str) -> Option<&CountryRecord> {
        self.countries.get(code)
    }

    pub fn metadata_for(&self, code: &str) -> Option<&CountryMetadata> {
        self.metadata.get(code)
    }

    pub fn value(&self, code: &str, year: i32) -> Option<f64> {
        self.country(code)?.value(year)
    }

    /// `(first, last)` year, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let first = *self.years.first()?;
        let last = *self.years.last()?;
        Some((first, last))
    }

    /// Defined values for `year` and their range.
    pub fn year_slice(&self, year: i32) -> YearSlice {
        let values: BTreeMap<String, f64> = self
            .countries
            .iter()
            .filter_map(|(code, record)| record.value(year).map(|v| (code.clone(), v)))
            .collect();

        let range = values
            .values()
            .copied()
            .fold(None, |acc: Option<ValueRange>, v| {
                Some(match acc {
                    None => ValueRange { min: v, max: v },
                    Some(r) => ValueRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                })
            })
            .unwrap_or_default();

        YearSlice {
            year,
            values,
            range,
        }
    }

    /// Hover panel content. `None` only when the code is not in the value table.
    pub fn country_info(&self, code: &str, year: i32) -> Option<CountryInfo> {
        let record = self.country(code)?;
        let metadata = self.metadata_for(code);
        let or_na = |field: Option<&String>| {
            field.cloned().unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Some(CountryInfo {
            code: record.code.clone(),
            name: record.name.clone(),
            year,
            formatted_value: format_magnitude(record.value(year)),
            region: or_na(metadata.and_then(|m| m.region.as_ref())),
            income_group: or_na(metadata.and_then(|m| m.income_group.as_ref())),
        })
    }

    /// Number of countries in the value table.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn record(code: &str, name: &str, values: &[(i32, f64)]) -> CountryRecord {
        CountryRecord {
            code: code.to_string(),
            name: name.to_string(),
            values: values.iter().copied().collect(),
        }
    }

    /// USA and LUX with 2022 values, ZZZ without.
    pub(crate) fn scenario_dataset() -> Dataset {
        Dataset::from_records(vec![
            record("USA", "United States", &[(2020, 2.1e13), (2022, 2.5e13)]),
            record("LUX", "Luxembourg", &[(2021, 7.9e10), (2022, 8e10)]),
            record("ZZZ", "Nowhere", &[(2020, 1.0e9)]),
        ])
    }

    #[test]
    fn years_are_the_union_of_defined_years() {
        let ds = scenario_dataset();
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2020, 2021, 2022]);
        assert_eq!(ds.year_bounds(), Some((2020, 2022)));
    }

    #[test]
    fn year_slice_ignores_missing_values() {
        let slice = scenario_dataset().year_slice(2022);
        assert_eq!(slice.values.len(), 2);
        assert_eq!(slice.value("ZZZ"), None);
        assert_eq!(slice.range, ValueRange { min: 8e10, max: 2.5e13 });
    }

    #[test]
    fn empty_year_has_zero_range() {
        let slice = scenario_dataset().year_slice(1999);
        assert!(slice.is_empty());
        assert_eq!(slice.range, ValueRange { min: 0.0, max: 0.0 });
    }

    #[test]
    fn duplicate_codes_keep_first_row() {
        let ds = Dataset::from_records(vec![
            record("FRA", "France", &[(2000, 1.0)]),
            record("FRA", "France again", &[(2001, 2.0)]),
        ]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.country("FRA").map(|r| r.name.as_str()), Some("France"));
        assert!(!ds.years.contains(&2001));
    }

    #[test]
    fn missing_metadata_reads_as_not_available() {
        let mut metadata = MetadataTable::new();
        metadata.insert(
            "LUX".to_string(),
            CountryMetadata {
                region: Some("Europe & Central Asia".to_string()),
                income_group: None,
                display_name: Some("Luxembourg".to_string()),
            },
        );
        let ds = scenario_dataset().with_metadata(metadata);

        let lux = ds.country_info("LUX", 2022).unwrap();
        assert_eq!(lux.region, "Europe & Central Asia");
        assert_eq!(lux.income_group, NOT_AVAILABLE);
        assert_eq!(lux.formatted_value, "$80.00 billion");

        let usa = ds.country_info("USA", 2022).unwrap();
        assert_eq!(usa.region, NOT_AVAILABLE);
        assert_eq!(usa.income_group, NOT_AVAILABLE);

        let zzz = ds.country_info("ZZZ", 2022).unwrap();
        assert_eq!(zzz.formatted_value, "No data");

        assert!(ds.country_info("ABC", 2022).is_none());
        assert_eq!(ds.value("ABC", 2022), None);
    }

    proptest! {
        #[test]
        fn slice_min_never_exceeds_max(
            values in proptest::collection::vec(proptest::option::of(0.0f64..1e14), 1..40)
        ) {
            let records = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let pairs: Vec<(i32, f64)> = v.iter().map(|v| (2000, *v)).collect();
                    record(&format!("C{i:02}"), "c", &pairs)
                })
                .collect();
            let ds = Dataset::from_records(records);
            let slice = ds.year_slice(2000);
            let defined: Vec<f64> = values.iter().flatten().copied().collect();
            if defined.is_empty() {
                prop_assert_eq!(slice.range, ValueRange::default());
            } else {
                prop_assert!(slice.range.min <= slice.range.max);
                for v in defined {
                    prop_assert!(slice.range.min <= v && v <= slice.range.max);
                }
            }
        }
    }
}
