use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};

const OUTPUT_DIR: &str = "sample_data";
const VALUE_FILE: &str = "API_SAMPLE_GDP.csv";
const METADATA_FILE: &str = "Metadata_Country_API_SAMPLE_GDP.csv";

const FIRST_YEAR: i32 = 1990;
const LAST_YEAR: i32 = 2023;

/// (code, name, region, income group, GDP in 2000 in US$, yearly growth)
const COUNTRIES: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("USA", "United States", "North America", "High income", 1.03e13, 0.045),
    ("CHN", "China", "East Asia & Pacific", "Upper middle income", 1.21e12, 0.12),
    ("JPN", "Japan", "East Asia & Pacific", "High income", 4.97e12, 0.0),
    ("DEU", "Germany", "Europe & Central Asia", "High income", 1.95e12, 0.03),
    ("IND", "India", "South Asia", "Lower middle income", 4.68e11, 0.09),
    ("GBR", "United Kingdom", "Europe & Central Asia", "High income", 1.67e12, 0.025),
    ("FRA", "France", "Europe & Central Asia", "High income", 1.36e12, 0.03),
    ("BRA", "Brazil", "Latin America & Caribbean", "Upper middle income", 6.55e11, 0.05),
    ("CAN", "Canada", "North America", "High income", 7.44e11, 0.04),
    ("KOR", "Korea, Rep.", "East Asia & Pacific", "High income", 5.76e11, 0.05),
    ("AUS", "Australia", "East Asia & Pacific", "High income", 4.15e11, 0.06),
    ("MEX", "Mexico", "Latin America & Caribbean", "Upper middle income", 7.08e11, 0.035),
    ("NGA", "Nigeria", "Sub-Saharan Africa", "Lower middle income", 6.9e10, 0.07),
    ("EGY", "Egypt, Arab Rep.", "Middle East & North Africa", "Lower middle income", 1.0e11, 0.05),
    ("NOR", "Norway", "Europe & Central Asia", "High income", 1.71e11, 0.05),
    ("LUX", "Luxembourg", "Europe & Central Asia", "High income", 2.1e10, 0.06),
    ("ISL", "Iceland", "Europe & Central Asia", "High income", 9.0e9, 0.06),
    ("NPL", "Nepal", "South Asia", "Low income", 5.5e9, 0.07),
    ("TUV", "Tuvalu", "East Asia & Pacific", "Upper middle income", 1.4e7, 0.05),
    ("SOM", "Somalia", "Sub-Saharan Africa", "Low income", 1.6e9, 0.04),
];

/// Aggregate rows the World Bank mixes into the same table (no region in metadata).
const AGGREGATES: &[(&str, &str, &str)] = &[
    ("WLD", "World", "Aggregates"),
    ("EUU", "European Union", "Aggregates"),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-spread, spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

/// One GDP series; roughly 1 in 12 years is left blank the way the real tables have gaps.
fn gdp_series(base_2000: f64, growth: f64, rng: &mut SimpleRng) -> Vec<Option<f64>> {
    (FIRST_YEAR..=LAST_YEAR)
        .map(|year| {
            let years = f64::from(year - 2000);
            let trend = base_2000 * (1.0 + growth).powf(years);
            let value = trend * (1.0 + rng.jitter(0.04));
            (rng.next_f64() > 1.0 / 12.0).then_some(value)
        })
        .collect()
}

fn write_value_table(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    // Four preamble lines precede the real header in World Bank downloads.
    writeln!(file, "\"Data Source\",\"World Development Indicators\",")?;
    writeln!(file)?;
    writeln!(file, "\"Last Updated Date\",\"2024-06-28\",")?;
    writeln!(file)?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .from_writer(file);

    let mut header = vec![
        "Country Name".to_string(),
        "Country Code".to_string(),
        "Indicator Name".to_string(),
        "Indicator Code".to_string(),
    ];
    header.extend((FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()));
    writer.write_record(&header)?;

    let mut world: Vec<f64> = vec![0.0; (LAST_YEAR - FIRST_YEAR + 1) as usize];
    let mut rows = 0;
    for &(code, name, _, _, base, growth) in COUNTRIES {
        let series = gdp_series(base, growth, rng);
        for (total, value) in world.iter_mut().zip(&series) {
            *total += value.unwrap_or(0.0);
        }
        writer.write_record(value_row(name, code, &series))?;
        rows += 1;
    }
    for &(code, name, _) in AGGREGATES {
        let series: Vec<Option<f64>> = match code {
            "WLD" => world.iter().map(|&v| Some(v)).collect(),
            _ => world.iter().map(|&v| Some(v * 0.18)).collect(),
        };
        writer.write_record(value_row(name, code, &series))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn value_row(name: &str, code: &str, series: &[Option<f64>]) -> Vec<String> {
    let mut row = vec![
        name.to_string(),
        code.to_string(),
        "GDP (current US$)".to_string(),
        "NY.GDP.MKTP.CD".to_string(),
    ];
    row.extend(
        series
            .iter()
            .map(|v| v.map(|v| format!("{v:.1}")).unwrap_or_default()),
    );
    row
}

fn write_metadata_table(path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "Country Code",
        "Region",
        "IncomeGroup",
        "SpecialNotes",
        "TableName",
    ])?;
    for &(code, name, region, income, _, _) in COUNTRIES {
        writer.write_record([code, region, income, "", name])?;
    }
    for &(code, name, notes) in AGGREGATES {
        writer.write_record([code, "", "", notes, name])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}/"))?;

    let values = dir.join(VALUE_FILE);
    let rows = write_value_table(&values, &mut rng).context("writing value table")?;
    let metadata = dir.join(METADATA_FILE);
    write_metadata_table(&metadata).context("writing metadata table")?;

    println!(
        "Wrote {rows} rows ({FIRST_YEAR}–{LAST_YEAR}) to {} and metadata to {}",
        values.display(),
        metadata.display()
    );
    println!("Run with GDP_MAP_VALUES={} GDP_MAP_METADATA={}", values.display(), metadata.display());
    Ok(())
}
