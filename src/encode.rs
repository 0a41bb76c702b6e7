//! Visual encoding: value → colour + extrusion height.
//!
//! ```text
//!   value ──log10(max(1, v))──► position on [logMin, logMax]
//!                                   │
//!                      normalized t ∈ [0,1]
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!             ColorRamp::color_at(t)   floor + t^power · (1 − floor)
//!                                                 │
//!                                   × heightScale × BASE_HEIGHT_UNIT
//! ```
//!
//! Everything here is a pure function of (dataset, year, parameters).
use std::collections::BTreeMap;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::ColorRamp;
use crate::config::{
    AMPLIFICATION_RANGE, BASE_HEIGHT_UNIT, DEFAULT_AMPLIFICATION, DEFAULT_HEIGHT_SCALE,
    DEFAULT_MIN_HEIGHT_FRACTION, HEIGHT_SCALE_RANGE, MIN_HEIGHT_RANGE,
};
use crate::data::model::{Dataset, ValueRange};
use crate::format::format_magnitude;

/// Normalized position used for every country when the year's log range is empty.
pub const DEGENERATE_POSITION: f64 = 0.5;

/// Normalized positions sampled for the height legend.
pub const HEIGHT_LEGEND_POSITIONS: [f64; 3] = [0.0, 0.5, 1.0];

// ---------------------------------------------------------------------------
// EncodingParameters
// ---------------------------------------------------------------------------

/// User-tunable knobs, read on every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodingParameters {
    pub height_scale: f64,
    pub amplification: f64,
    /// Fraction of full height every country with data gets at minimum.
    pub min_height_fraction: f64,
}

impl Default for EncodingParameters {
    fn default() -> Self {
        Self {
            height_scale: DEFAULT_HEIGHT_SCALE,
            amplification: DEFAULT_AMPLIFICATION,
            min_height_fraction: DEFAULT_MIN_HEIGHT_FRACTION,
        }
    }
}

impl EncodingParameters {
    /// Clamp every field into its control range; non-finite fields fall back to defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let clamp = |v: f64, fallback: f64, range: &std::ops::RangeInclusive<f64>| {
            if v.is_finite() {
                v.clamp(*range.start(), *range.end())
            } else {
                fallback
            }
        };
        Self {
            height_scale: clamp(self.height_scale, defaults.height_scale, &HEIGHT_SCALE_RANGE),
            amplification: clamp(
                self.amplification,
                defaults.amplification,
                &AMPLIFICATION_RANGE,
            ),
            min_height_fraction: clamp(
                self.min_height_fraction,
                defaults.min_height_fraction,
                &MIN_HEIGHT_RANGE,
            ),
        }
    }

    /// Height of a country at normalized position 1.
    pub fn max_height(&self) -> f64 {
        BASE_HEIGHT_UNIT * self.height_scale
    }

    /// `floor + t^power · (1 − floor)`, in [floor, 1] for t in [0, 1].
    pub fn height_fraction(&self, normalized: f64) -> f64 {
        let floor = self.min_height_fraction;
        floor + normalized.powf(self.amplification) * (1.0 - floor)
    }
}

// ---------------------------------------------------------------------------
// LogDomain
// ---------------------------------------------------------------------------

/// `[log10(max(1, min)), log10(max)]` for one year's range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogDomain {
    pub min: f64,
    pub max: f64,
}

impl LogDomain {
    pub fn from_range(range: ValueRange) -> Self {
        Self {
            min: range.min.max(1.0).log10(),
            max: range.max.log10(),
        }
    }

    /// True when the domain has no positive finite span (one distinct value,
    /// all values ≤ 1, or a non-positive maximum).
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.max > self.min)
    }

    /// Position of `value` on the domain, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return DEGENERATE_POSITION;
        }
        let log_value = value.max(1.0).log10();
        let t = (log_value - self.min) / (self.max - self.min);
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, 1.0)
    }

    /// Inverse of [`normalize`](Self::normalize) for a non-degenerate domain.
    pub fn value_at(&self, normalized: f64) -> f64 {
        10f64.powf(self.min + normalized * (self.max - self.min))
    }
}

// ---------------------------------------------------------------------------
// Per-country output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryEncoding {
    pub value: Option<f64>,
    /// `None` for countries without data.
    pub normalized: Option<f64>,
    pub color: Srgb<u8>,
    pub height_fraction: f64,
    /// Extrusion height in sink units.
    pub height: f64,
}

impl CountryEncoding {
    pub fn no_data(ramp: &ColorRamp) -> Self {
        Self {
            value: None,
            normalized: None,
            color: ramp.no_data(),
            height_fraction: 0.0,
            height: 0.0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.value.is_some()
    }
}

/// Encode one value against a year's domain.
pub fn encode_value(
    value: Option<f64>,
    domain: &LogDomain,
    params: &EncodingParameters,
    ramp: &ColorRamp,
) -> CountryEncoding {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return CountryEncoding::no_data(ramp);
    };
    let normalized = domain.normalize(v);
    let height_fraction = params.height_fraction(normalized);

    CountryEncoding {
        value: Some(v),
        normalized: Some(normalized),
        color: ramp.color_at(normalized),
        height_fraction,
        height: height_fraction * params.max_height(),
    }
}

// ---------------------------------------------------------------------------
// Legends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColorLegendEntry {
    pub color: Srgb<u8>,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightLegendEntry {
    pub normalized: f64,
    pub value: f64,
    pub fraction: f64,
    pub height: f64,
    pub label: String,
}

/// One entry per palette stop, labelled with the value at that stop.
pub fn color_legend(
    range: ValueRange,
    domain: &LogDomain,
    ramp: &ColorRamp,
    has_data: bool,
) -> Vec<ColorLegendEntry> {
    if !has_data {
        return Vec::new();
    }
    if domain.is_degenerate() {
        return vec![ColorLegendEntry {
            color: ramp.color_at(DEGENERATE_POSITION),
            value: range.max,
            label: format_magnitude(Some(range.max)),
        }];
    }

    let last = ramp.len().saturating_sub(1);
    (0..ramp.len())
        .map(|i| {
            let position = ramp.stop_position(i);
            let value = domain.value_at(position);
            let formatted = format_magnitude(Some(value));
            let label = match i {
                0 => format!("< {formatted}"),
                i if i == last => format!("> {formatted}"),
                _ => formatted,
            };
            ColorLegendEntry {
                color: ramp.stops()[i],
                value,
                label,
            }
        })
        .collect()
}

/// Min / mid / max sample bars for the current parameters.
pub fn height_legend(
    range: ValueRange,
    domain: &LogDomain,
    params: &EncodingParameters,
    has_data: bool,
) -> Vec<HeightLegendEntry> {
    if !has_data {
        return Vec::new();
    }
    let entry = |normalized: f64, value: f64| {
        let fraction = params.height_fraction(normalized);
        HeightLegendEntry {
            normalized,
            value,
            fraction,
            height: fraction * params.max_height(),
            label: format!("{} ({:.1}%)", format_magnitude(Some(value)), fraction * 100.0),
        }
    };

    if domain.is_degenerate() {
        return vec![entry(DEGENERATE_POSITION, range.max)];
    }
    HEIGHT_LEGEND_POSITIONS
        .iter()
        .map(|&t| entry(t, domain.value_at(t)))
        .collect()
}

// ---------------------------------------------------------------------------
// YearEncoding – everything the sink and the legend need for one frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct YearEncoding {
    pub year: i32,
    pub params: EncodingParameters,
    pub range: ValueRange,
    pub domain: LogDomain,
    /// Every country of the value table, with or without data.
    pub countries: BTreeMap<String, CountryEncoding>,
    pub color_legend: Vec<ColorLegendEntry>,
    pub height_legend: Vec<HeightLegendEntry>,
}

impl YearEncoding {
    pub fn get(&self, code: &str) -> Option<&CountryEncoding> {
        self.countries.get(code)
    }

    /// Countries with data, tallest first (ties broken by code).
    pub fn ranked(&self) -> Vec<(&str, &CountryEncoding)> {
        let mut ranked: Vec<(&str, &CountryEncoding)> = self
            .countries
            .iter()
            .filter(|(_, e)| e.has_data())
            .map(|(code, e)| (code.as_str(), e))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.value
                .partial_cmp(&a.1.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }
}

/// Encode every country of `dataset` for `year`.
pub fn encode_year(
    dataset: &Dataset,
    year: i32,
    params: &EncodingParameters,
    ramp: &ColorRamp,
) -> YearEncoding {
    let params = params.sanitized();
    let slice = dataset.year_slice(year);
    let domain = LogDomain::from_range(slice.range);
    let has_data = !slice.is_empty();

    let countries = dataset
        .countries
        .keys()
        .map(|code| {
            let encoding = encode_value(slice.value(code), &domain, &params, ramp);
            (code.clone(), encoding)
        })
        .collect();

    YearEncoding {
        year,
        params,
        range: slice.range,
        domain,
        countries,
        color_legend: color_legend(slice.range, &domain, ramp, has_data),
        height_legend: height_legend(slice.range, &domain, &params, has_data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COLOR_STOPS;
    use crate::data::model::tests::{record, scenario_dataset};
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn scenario_default_parameters() {
        let ds = scenario_dataset();
        let params = EncodingParameters::default();
        let enc = encode_year(&ds, 2022, &params, &ColorRamp::default());

        let zzz = enc.get("ZZZ").unwrap();
        assert_eq!(zzz.color, crate::config::NO_DATA_COLOR);
        assert_eq!(zzz.height, 0.0);
        assert!(!zzz.has_data());

        let usa = enc.get("USA").unwrap();
        assert_eq!(usa.normalized, Some(1.0));
        assert_eq!(usa.color, COLOR_STOPS[8]);
        assert!(close(usa.height_fraction, 1.0));
        assert!(close(usa.height, 300.0 * 10_000.0));

        // LUX is the year's minimum: first stop, floor height.
        let lux = enc.get("LUX").unwrap();
        assert_eq!(lux.normalized, Some(0.0));
        assert_ne!(lux.color, usa.color);
        assert_eq!(lux.color, COLOR_STOPS[0]);
        assert!(close(lux.height_fraction, 0.01));
        assert!(lux.height < usa.height);
    }

    #[test]
    fn intermediate_value_gets_intermediate_color_and_height() {
        let ds = Dataset::from_records(vec![
            record("USA", "United States", &[(2022, 2.5e13)]),
            record("LUX", "Luxembourg", &[(2022, 8e10)]),
            record("DEU", "Germany", &[(2022, 4.1e12)]),
        ]);
        let params = EncodingParameters::default();
        let enc = encode_year(&ds, 2022, &params, &ColorRamp::default());

        let deu = enc.get("DEU").unwrap();
        let t = deu.normalized.unwrap();
        assert!(t > 0.0 && t < 1.0);
        assert!(!COLOR_STOPS.contains(&deu.color));
        assert!(enc.get("LUX").unwrap().height < deu.height);
        assert!(deu.height < enc.get("USA").unwrap().height);
    }

    #[test]
    fn single_valued_year_renders_at_midpoint() {
        let ds = Dataset::from_records(vec![
            record("USA", "United States", &[(2022, 2.5e13)]),
            record("CAN", "Canada", &[(2021, 2.0e12)]),
        ]);
        let params = EncodingParameters::default();
        let ramp = ColorRamp::default();
        let enc = encode_year(&ds, 2022, &params, &ramp);

        assert!(enc.domain.is_degenerate());
        let usa = enc.get("USA").unwrap();
        assert_eq!(usa.normalized, Some(DEGENERATE_POSITION));
        assert_eq!(usa.color, COLOR_STOPS[4]);
        assert!(close(usa.height_fraction, 0.01 + 0.5f64.powf(10.0) * 0.99));
        assert!(usa.height.is_finite());

        assert_eq!(enc.color_legend.len(), 1);
        assert_eq!(enc.color_legend[0].label, "$25.00 trillion");
        assert_eq!(enc.height_legend.len(), 1);
    }

    #[test]
    fn non_positive_maximum_is_degenerate_not_nan() {
        let ds = Dataset::from_records(vec![
            record("AAA", "A", &[(2000, 0.0)]),
            record("BBB", "B", &[(2000, -5.0)]),
        ]);
        let enc = encode_year(&ds, 2000, &EncodingParameters::default(), &ColorRamp::default());

        assert!(enc.domain.is_degenerate());
        for e in enc.countries.values() {
            assert_eq!(e.normalized, Some(DEGENERATE_POSITION));
            assert!(e.height.is_finite());
        }
    }

    #[test]
    fn year_without_data_is_all_no_data_with_empty_legends() {
        let ds = scenario_dataset();
        let ramp = ColorRamp::default();
        let enc = encode_year(&ds, 1990, &EncodingParameters::default(), &ramp);

        assert!(enc.countries.values().all(|e| *e == CountryEncoding::no_data(&ramp)));
        assert!(enc.color_legend.is_empty());
        assert!(enc.height_legend.is_empty());
        assert!(enc.ranked().is_empty());
    }

    #[test]
    fn color_legend_labels_each_stop() {
        let ds = scenario_dataset();
        let enc = encode_year(&ds, 2022, &EncodingParameters::default(), &ColorRamp::default());

        assert_eq!(enc.color_legend.len(), COLOR_STOPS.len());
        assert_eq!(enc.color_legend[0].label, "< $80.00 billion");
        assert_eq!(enc.color_legend[8].label, "> $25.00 trillion");
        assert!(close(enc.color_legend[0].value, 8e10));
        assert!(close(enc.color_legend[8].value, 2.5e13));
        assert!(enc
            .color_legend
            .windows(2)
            .all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn height_legend_samples_min_mid_max() {
        let ds = scenario_dataset();
        let params = EncodingParameters {
            height_scale: 100.0,
            amplification: 2.0,
            min_height_fraction: 0.1,
        };
        let enc = encode_year(&ds, 2022, &params, &ColorRamp::default());

        let fractions: Vec<f64> = enc.height_legend.iter().map(|e| e.fraction).collect();
        assert_eq!(fractions.len(), 3);
        assert!(close(fractions[0], 0.1));
        assert!(close(fractions[1], 0.1 + 0.25 * 0.9));
        assert!(close(fractions[2], 1.0));
        assert!(close(enc.height_legend[2].height, 1_000_000.0));
        assert_eq!(enc.height_legend[0].label, "$80.00 billion (10.0%)");
        assert_eq!(enc.height_legend[2].label, "$25.00 trillion (100.0%)");
    }

    #[test]
    fn out_of_range_parameters_are_clamped() {
        let wild = EncodingParameters {
            height_scale: -4.0,
            amplification: f64::NAN,
            min_height_fraction: 3.0,
        }
        .sanitized();
        assert_eq!(wild.height_scale, 1.0);
        assert_eq!(wild.amplification, DEFAULT_AMPLIFICATION);
        assert_eq!(wild.min_height_fraction, 0.2);

        let enc = encode_year(&scenario_dataset(), 2022, &wild, &ColorRamp::default());
        assert_eq!(enc.params, wild);
    }

    #[test]
    fn encoding_is_idempotent() {
        let ds = scenario_dataset();
        let params = EncodingParameters::default();
        let ramp = ColorRamp::default();
        assert_eq!(
            encode_year(&ds, 2022, &params, &ramp),
            encode_year(&ds, 2022, &params, &ramp)
        );
    }

    #[test]
    fn ranking_is_by_value_descending() {
        let enc = encode_year(
            &scenario_dataset(),
            2022,
            &EncodingParameters::default(),
            &ColorRamp::default(),
        );
        let codes: Vec<&str> = enc.ranked().iter().map(|(c, _)| *c).collect();
        assert_eq!(codes, vec!["USA", "LUX"]);
    }

    proptest! {
        #[test]
        fn normalized_stays_in_unit_interval(
            lo in 0.0f64..1e9,
            span in 1.0f64..1e6,
            t in 0.0f64..=1.0,
        ) {
            let range = ValueRange { min: lo, max: lo * span + 10.0 };
            let domain = LogDomain::from_range(range);
            let v = range.min + t * (range.max - range.min);
            let n = domain.normalize(v);
            prop_assert!((0.0..=1.0).contains(&n));
        }

        #[test]
        fn height_is_monotone_in_value(
            a in 1.0f64..1e14,
            b in 1.0f64..1e14,
            amplification in 0.5f64..=50.0,
            floor in 0.0f64..=0.2,
        ) {
            let (v1, v2) = if a <= b { (a, b) } else { (b, a) };
            let domain = LogDomain::from_range(ValueRange { min: 1.0, max: 1e14 });
            let params = EncodingParameters {
                height_scale: 300.0,
                amplification,
                min_height_fraction: floor,
            };
            let ramp = ColorRamp::default();
            let h1 = encode_value(Some(v1), &domain, &params, &ramp).height;
            let h2 = encode_value(Some(v2), &domain, &params, &ramp).height;
            prop_assert!(h1 <= h2, "{v1} -> {h1}, {v2} -> {h2}");
        }
    }
}
