use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{FeatureGeometry, PaintUpdate, RenderSink};
use crate::color::to_hex;
use crate::labels::LabelPoint;

/// Feature property carrying the country code in the boundaries tileset.
pub const CODE_PROPERTY: &str = "iso_3166_1_alpha_3";

pub const FILL_LAYER: &str = "country-fills";
pub const EXTRUSION_LAYER: &str = "country-extrusions";
pub const LABEL_SOURCE: &str = "country-label-points";

// ---------------------------------------------------------------------------
// MapboxStyleSink – PaintUpdate → Mapbox GL style expressions
// ---------------------------------------------------------------------------

/// Keeps the latest paint properties as Mapbox GL JSON so a web map (or a
/// file on disk) can pick them up, plus the country outlines used for hover
/// and label placement.
#[derive(Debug, Clone)]
pub struct MapboxStyleSink {
    features: BTreeMap<String, FeatureGeometry>,
    hovered: Option<String>,
    fill_color: Value,
    extrusion_height: Value,
    extrusions_visible: bool,
    labels: Vec<LabelPoint>,
}

impl Default for MapboxStyleSink {
    fn default() -> Self {
        Self {
            features: BTreeMap::new(),
            hovered: None,
            fill_color: Value::Null,
            extrusion_height: json!(0),
            extrusions_visible: true,
            labels: Vec::new(),
        }
    }
}

impl MapboxStyleSink {
    /// Register outlines from a GeoJSON `FeatureCollection`. Features without
    /// a code or with non-polygon geometry are skipped. Returns how many were kept.
    pub fn load_features(&mut self, geojson: &str) -> Result<usize, serde_json::Error> {
        let collection: FeatureCollection = serde_json::from_str(geojson)?;
        let mut kept = 0;
        for feature in collection.features {
            let Some(code) = feature.properties.and_then(|p| p.iso_3166_1_alpha_3) else {
                continue;
            };
            let Some(geometry) = feature.geometry.and_then(RawGeometry::into_geometry) else {
                continue;
            };
            self.insert_feature(code, geometry);
            kept += 1;
        }
        Ok(kept)
    }

    pub fn insert_feature(&mut self, code: impl Into<String>, geometry: FeatureGeometry) {
        self.features.insert(code.into(), geometry);
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Hover events from the map engine; unknown codes clear the hover.
    pub fn set_hovered(&mut self, code: Option<&str>) {
        self.hovered = code
            .filter(|c| self.features.is_empty() || self.features.contains_key(*c))
            .map(str::to_string);
    }

    pub fn set_labels(&mut self, labels: Vec<LabelPoint>) {
        self.labels = labels;
    }

    /// Layers, paint/layout properties and the label source as one JSON document.
    pub fn style_document(&self) -> Value {
        let visibility = if self.extrusions_visible { "visible" } else { "none" };
        let label_features: Vec<Value> = self
            .labels
            .iter()
            .map(|label| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": label.position },
                    "properties": label,
                })
            })
            .collect();

        json!({
            "layers": [
                {
                    "id": FILL_LAYER,
                    "type": "fill",
                    "paint": { "fill-color": self.fill_color, "fill-opacity": 0.8 },
                },
                {
                    "id": EXTRUSION_LAYER,
                    "type": "fill-extrusion",
                    "layout": { "visibility": visibility },
                    "paint": {
                        "fill-extrusion-color": self.fill_color,
                        "fill-extrusion-height": self.extrusion_height,
                        "fill-extrusion-base": 0,
                        "fill-extrusion-opacity": 0.8,
                    },
                },
            ],
            "sources": {
                LABEL_SOURCE: {
                    "type": "geojson",
                    "data": { "type": "FeatureCollection", "features": label_features },
                },
            },
        })
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.style_document())
            .context("serialising map style")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing map style to {}", path.display()))?;
        Ok(())
    }
}

/// `["match", ["get", code], k1, v1, ..., fallback]`; a bare fallback when empty.
fn match_expression<'a>(pairs: impl Iterator<Item = (&'a String, Value)>, fallback: Value) -> Value {
    let mut expression = vec![json!("match"), json!(["get", CODE_PROPERTY])];
    for (code, value) in pairs {
        expression.push(json!(code));
        expression.push(value);
    }
    if expression.len() == 2 {
        return fallback;
    }
    expression.push(fallback);
    Value::Array(expression)
}

impl RenderSink for MapboxStyleSink {
    fn apply(&mut self, update: &PaintUpdate) {
        self.fill_color = match_expression(
            update.fills.iter().map(|(code, c)| (code, json!(to_hex(*c)))),
            json!(to_hex(update.no_data)),
        );
        self.extrusion_height = match_expression(
            update.heights.iter().map(|(code, h)| (code, json!(h))),
            json!(0),
        );
        self.extrusions_visible = update.extrusions_visible;
    }

    fn hovered_country(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    fn feature_geometry(&self, code: &str) -> Option<&FeatureGeometry> {
        self.features.get(code)
    }
}

// ---------------------------------------------------------------------------
// GeoJSON input
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Option<FeatureProperties>,
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct FeatureProperties {
    iso_3166_1_alpha_3: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl RawGeometry {
    fn into_geometry(self) -> Option<FeatureGeometry> {
        match self {
            RawGeometry::Polygon { coordinates } => {
                Some(FeatureGeometry::Polygon(convert_rings(coordinates)))
            }
            RawGeometry::MultiPolygon { coordinates } => Some(FeatureGeometry::MultiPolygon(
                coordinates.into_iter().map(convert_rings).collect(),
            )),
            RawGeometry::Unsupported => None,
        }
    }
}

/// Drop altitude and malformed positions.
fn convert_rings(rings: Vec<Vec<Vec<f64>>>) -> Vec<Vec<[f64; 2]>> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter_map(|p| match p.as_slice() {
                    [lon, lat, ..] => Some([*lon, *lat]),
                    _ => None,
                })
                .collect()
        })
        .collect()
}
