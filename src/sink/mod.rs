/// Rendering side: the map engine is an external collaborator.
///
/// Architecture:
/// ```text
///   YearEncoding + ViewMode
///          │
///          ▼
///   ┌─────────────┐
///   │ PaintUpdate │  plain colour / height per country code
///   └─────────────┘
///          │ RenderSink::apply
///          ▼
///   ┌──────────────┐
///   │ adapter      │  e.g. Mapbox GL style expressions
///   └──────────────┘
/// ```
pub mod mapbox;

use std::collections::BTreeMap;

use palette::Srgb;

use crate::encode::YearEncoding;
use crate::state::ViewMode;

// ---------------------------------------------------------------------------
// PaintUpdate
// ---------------------------------------------------------------------------

/// Everything a sink needs to restyle the country layers for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintUpdate {
    /// Fill colour per country with data.
    pub fills: BTreeMap<String, Srgb<u8>>,
    /// Extrusion height per country with data, in sink units.
    pub heights: BTreeMap<String, f64>,
    /// Fill for features with no entry in `fills`.
    pub no_data: Srgb<u8>,
    pub extrusions_visible: bool,
}

impl PaintUpdate {
    pub fn from_encoding(encoding: &YearEncoding, no_data: Srgb<u8>, view_mode: ViewMode) -> Self {
        let with_data = || encoding.countries.iter().filter(|(_, e)| e.has_data());
        PaintUpdate {
            fills: with_data().map(|(code, e)| (code.clone(), e.color)).collect(),
            heights: with_data().map(|(code, e)| (code.clone(), e.height)).collect(),
            no_data,
            extrusions_visible: view_mode == ViewMode::Extruded,
        }
    }
}

// ---------------------------------------------------------------------------
// Feature geometry
// ---------------------------------------------------------------------------

/// Country outline as `[lon, lat]` rings; the first ring of each polygon is the outer one.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

impl FeatureGeometry {
    /// Centre of the bounding box of all outer rings.
    pub fn representative_point(&self) -> Option<[f64; 2]> {
        let outer_rings: Vec<&Vec<[f64; 2]>> = match self {
            FeatureGeometry::Polygon(rings) => rings.first().into_iter().collect(),
            FeatureGeometry::MultiPolygon(polygons) => {
                polygons.iter().filter_map(|rings| rings.first()).collect()
            }
        };

        let mut points = outer_rings.into_iter().flatten();
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                [min[0].min(p[0]), min[1].min(p[1])],
                [max[0].max(p[0]), max[1].max(p[1])],
            )
        });
        Some([(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0])
    }
}

// ---------------------------------------------------------------------------
// RenderSink
// ---------------------------------------------------------------------------

/// A map renderer that can be restyled per country and queried for hover.
pub trait RenderSink {
    fn apply(&mut self, update: &PaintUpdate);

    /// Country code of the feature under the pointer, if any.
    fn hovered_country(&self) -> Option<&str>;

    fn feature_geometry(&self, code: &str) -> Option<&FeatureGeometry>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRamp;
    use crate::config::NO_DATA_COLOR;
    use crate::data::model::tests::scenario_dataset;
    use crate::encode::{encode_year, EncodingParameters};

    #[test]
    fn paint_update_skips_countries_without_data() {
        let enc = encode_year(
            &scenario_dataset(),
            2022,
            &EncodingParameters::default(),
            &ColorRamp::default(),
        );
        let update = PaintUpdate::from_encoding(&enc, NO_DATA_COLOR, ViewMode::Extruded);

        assert_eq!(update.fills.keys().collect::<Vec<_>>(), vec!["LUX", "USA"]);
        assert!(!update.heights.contains_key("ZZZ"));
        assert!(update.extrusions_visible);

        let flat = PaintUpdate::from_encoding(&enc, NO_DATA_COLOR, ViewMode::Flat);
        assert!(!flat.extrusions_visible);
        assert_eq!(flat.heights, update.heights);
    }

    #[test]
    fn polygon_anchor_is_bounding_box_centre_of_outer_ring() {
        let square_with_hole = FeatureGeometry::Polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[50.0, 50.0], [60.0, 60.0]],
        ]);
        assert_eq!(square_with_hole.representative_point(), Some([5.0, 2.0]));
    }

    #[test]
    fn multipolygon_anchor_spans_all_parts() {
        let islands = FeatureGeometry::MultiPolygon(vec![
            vec![vec![[-10.0, -2.0], [-8.0, 0.0]]],
            vec![vec![[4.0, 6.0], [6.0, 8.0]]],
        ]);
        assert_eq!(islands.representative_point(), Some([-2.0, 3.0]));
    }

    #[test]
    fn empty_geometry_has_no_anchor() {
        assert_eq!(FeatureGeometry::Polygon(Vec::new()).representative_point(), None);
        assert_eq!(FeatureGeometry::MultiPolygon(vec![vec![]]).representative_point(), None);
    }
}
