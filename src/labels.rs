use serde::Serialize;

use crate::data::model::Dataset;
use crate::encode::YearEncoding;
use crate::format::format_magnitude;
use crate::sink::RenderSink;
use crate::state::ViewMode;

/// A point label for one country, placed on top of its extrusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPoint {
    pub country_code: String,
    pub country_name: String,
    /// `[lon, lat]`.
    #[serde(skip)]
    pub position: [f64; 2],
    pub value: f64,
    pub formatted_value: String,
    /// Extrusion height, 0 in the flat view.
    pub height: f64,
}

/// Labels for every country that has data this year and an outline in the sink.
pub fn label_points(
    dataset: &Dataset,
    encoding: &YearEncoding,
    view_mode: ViewMode,
    sink: &dyn RenderSink,
) -> Vec<LabelPoint> {
    encoding
        .countries
        .iter()
        .filter_map(|(code, encoded)| {
            let value = encoded.value?;
            let position = sink.feature_geometry(code)?.representative_point()?;
            let name = dataset
                .country(code)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| code.clone());
            let height = match view_mode {
                ViewMode::Extruded => encoded.height,
                ViewMode::Flat => 0.0,
            };
            Some(LabelPoint {
                country_code: code.clone(),
                country_name: name,
                position,
                value,
                formatted_value: format_magnitude(Some(value)),
                height,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRamp;
    use crate::data::model::tests::scenario_dataset;
    use crate::encode::{encode_year, EncodingParameters};
    use crate::sink::mapbox::MapboxStyleSink;
    use crate::sink::FeatureGeometry;

    fn square(x: f64, y: f64) -> FeatureGeometry {
        FeatureGeometry::Polygon(vec![vec![[x, y], [x + 2.0, y], [x + 2.0, y + 2.0], [x, y + 2.0]]])
    }

    #[test]
    fn labels_need_data_and_geometry() {
        let ds = scenario_dataset();
        let enc = encode_year(&ds, 2022, &EncodingParameters::default(), &ColorRamp::default());
        let mut sink = MapboxStyleSink::default();
        sink.insert_feature("USA", square(-100.0, 40.0));
        sink.insert_feature("ZZZ", square(0.0, 0.0));

        let labels = label_points(&ds, &enc, ViewMode::Extruded, &sink);
        assert_eq!(labels.len(), 1);
        let usa = &labels[0];
        assert_eq!(usa.country_code, "USA");
        assert_eq!(usa.country_name, "United States");
        assert_eq!(usa.position, [-99.0, 41.0]);
        assert_eq!(usa.formatted_value, "$25.00 trillion");
        assert_eq!(usa.height, enc.get("USA").unwrap().height);
    }

    #[test]
    fn flat_view_labels_sit_on_the_ground() {
        let ds = scenario_dataset();
        let enc = encode_year(&ds, 2022, &EncodingParameters::default(), &ColorRamp::default());
        let mut sink = MapboxStyleSink::default();
        sink.insert_feature("LUX", square(5.0, 49.0));

        let labels = label_points(&ds, &enc, ViewMode::Flat, &sink);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].height, 0.0);
    }

    #[test]
    fn label_properties_serialise_in_camel_case() {
        let label = LabelPoint {
            country_code: "LUX".to_string(),
            country_name: "Luxembourg".to_string(),
            position: [6.0, 49.8],
            value: 8e10,
            formatted_value: "$80.00 billion".to_string(),
            height: 30_000.0,
        };
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json["countryCode"], "LUX");
        assert_eq!(json["formattedValue"], "$80.00 billion");
        assert!(json.get("position").is_none());
    }
}
