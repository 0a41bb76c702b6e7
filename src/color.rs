use eframe::egui::Color32;
use palette::{Mix, Srgb};

use crate::config::{COLOR_STOPS, NO_DATA_COLOR};

// ---------------------------------------------------------------------------
// Colour ramp: normalized [0,1] position → colour
// ---------------------------------------------------------------------------

/// An ordered palette interpolated linearly between evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Srgb<u8>>,
    no_data: Srgb<u8>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::new(COLOR_STOPS.to_vec(), NO_DATA_COLOR)
    }
}

impl ColorRamp {
    /// An empty `stops` list paints everything with the no-data colour.
    pub fn new(stops: Vec<Srgb<u8>>, no_data: Srgb<u8>) -> Self {
        ColorRamp { stops, no_data }
    }

    pub fn stops(&self) -> &[Srgb<u8>] {
        &self.stops
    }

    pub fn no_data(&self) -> Srgb<u8> {
        self.no_data
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Normalized position of stop `i`.
    pub fn stop_position(&self, i: usize) -> f64 {
        if self.stops.len() < 2 {
            return 0.0;
        }
        i as f64 / (self.stops.len() - 1) as f64
    }

    /// Colour at normalized position `t`; the first stop at or below 0, the
    /// last at or above 1.
    pub fn color_at(&self, t: f64) -> Srgb<u8> {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return self.no_data;
        };
        if t.is_nan() || t <= 0.0 {
            return *first;
        }
        if t >= 1.0 {
            return *last;
        }

        let scaled = t * (self.stops.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let Some(&upper) = self.stops.get(lower + 1) else {
            return *last;
        };
        let from: Srgb<f32> = self.stops[lower].into_format();
        let to: Srgb<f32> = upper.into_format();
        from.mix(to, (scaled - lower as f64) as f32).into_format()
    }
}

// ---------------------------------------------------------------------------
// Conversions for the rendering side
// ---------------------------------------------------------------------------

pub fn to_color32(color: Srgb<u8>) -> Color32 {
    Color32::from_rgb(color.red, color.green, color.blue)
}

/// `#rrggbb`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}
