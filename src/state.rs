use std::sync::mpsc::{Receiver, TryRecvError};

use crate::color::ColorRamp;
use crate::config::{DataPaths, DEFAULT_YEAR};
use crate::data::loader::{spawn_load, LoadError, LoadedTables};
use crate::data::model::{CountryInfo, Dataset};
use crate::encode::{encode_year, EncodingParameters, YearEncoding};
use crate::labels::{label_points, LabelPoint};
use crate::sink::mapbox::MapboxStyleSink;
use crate::sink::{PaintUpdate, RenderSink};

// ---------------------------------------------------------------------------
// View mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Choropleth only.
    Flat,
    /// Choropleth plus extruded countries.
    #[default]
    Extruded,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Flat => ViewMode::Extruded,
            ViewMode::Extruded => ViewMode::Flat,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering. Every setter clamps its
/// input and re-encodes synchronously.
pub struct AppState {
    /// Loaded dataset (None while loading or after a failed load).
    pub dataset: Option<Dataset>,

    pub year: i32,

    pub params: EncodingParameters,

    pub view_mode: ViewMode,

    pub ramp: ColorRamp,

    /// Encoding of the current (dataset, year, params).
    pub encoding: Option<YearEncoding>,

    /// Label points of the current encoding.
    pub labels: Vec<LabelPoint>,

    /// Rendering sink that receives every paint update.
    pub sink: MapboxStyleSink,

    /// Blocking error shown in the UI; set when loading fails.
    pub status_message: Option<String>,

    /// Whether the source tables are still being read.
    pub loading: bool,

    /// In-flight background load.
    pending: Option<Receiver<Result<LoadedTables, LoadError>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            year: DEFAULT_YEAR,
            params: EncodingParameters::default(),
            view_mode: ViewMode::default(),
            ramp: ColorRamp::default(),
            encoding: None,
            labels: Vec::new(),
            sink: MapboxStyleSink::default(),
            status_message: None,
            loading: true,
            pending: None,
        }
    }
}

impl AppState {
    /// Start a fresh session: drop the current data and read `paths` in the background.
    pub fn begin_load(&mut self, paths: DataPaths) {
        log::info!(
            "Loading {} and {}",
            paths.values.display(),
            paths.metadata.display()
        );
        self.dataset = None;
        self.encoding = None;
        self.labels.clear();
        self.sink = MapboxStyleSink::default();
        self.status_message = None;
        self.loading = true;
        self.pending = Some(spawn_load(paths));
    }

    /// Collect the background load if it has finished. Returns `true` while
    /// the load is still running.
    pub fn poll_load(&mut self) -> bool {
        let outcome = match &self.pending {
            Some(rx) => rx.try_recv(),
            None => return false,
        };
        let result = match outcome {
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => Err(LoadError::WorkerLost),
            Ok(result) => result,
        };
        self.pending = None;
        self.finish_load(result);
        false
    }

    pub fn finish_load(&mut self, result: Result<LoadedTables, LoadError>) {
        match result {
            Ok(loaded) => {
                if let Some(geojson) = &loaded.boundaries {
                    match self.sink.load_features(geojson) {
                        Ok(kept) => log::info!("Loaded {kept} country outlines"),
                        Err(e) => log::warn!("Ignoring country outlines: {e}"),
                    }
                }
                self.set_dataset(loaded.dataset);
            }
            Err(e) => {
                log::error!("Failed to load GDP data: {e}");
                self.set_load_error(format!("Failed to load GDP data: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, pick the starting year and encode.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.year = match dataset.year_bounds() {
            Some((first, last)) if (first..=last).contains(&DEFAULT_YEAR) => DEFAULT_YEAR,
            Some((_, last)) => last,
            None => DEFAULT_YEAR,
        };
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.recompute();
    }

    /// Record a terminal load failure. The session stays non-interactive.
    pub fn set_load_error(&mut self, message: String) {
        self.dataset = None;
        self.encoding = None;
        self.labels.clear();
        self.status_message = Some(message);
        self.loading = false;
    }

    /// Interactive controls are only live once a dataset is in place.
    pub fn is_interactive(&self) -> bool {
        self.dataset.is_some() && !self.loading
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.dataset.as_ref()?.year_bounds()
    }

    /// Select a year, clamped to the dataset's bounds.
    pub fn set_year(&mut self, year: i32) {
        let Some((first, last)) = self.year_bounds() else {
            return;
        };
        let year = year.clamp(first, last);
        if year != self.year {
            self.year = year;
            self.recompute();
        }
    }

    pub fn set_params(&mut self, params: EncodingParameters) {
        let params = params.sanitized();
        if params != self.params {
            self.params = params;
            self.recompute();
        }
    }

    pub fn set_height_scale(&mut self, height_scale: f64) {
        self.set_params(EncodingParameters {
            height_scale,
            ..self.params
        });
    }

    pub fn set_amplification(&mut self, amplification: f64) {
        self.set_params(EncodingParameters {
            amplification,
            ..self.params
        });
    }

    pub fn set_min_height_fraction(&mut self, min_height_fraction: f64) {
        self.set_params(EncodingParameters {
            min_height_fraction,
            ..self.params
        });
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
        self.recompute();
    }

    /// Re-encode the current year and push the result to the sink.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let encoding = encode_year(dataset, self.year, &self.params, &self.ramp);

        let update = PaintUpdate::from_encoding(&encoding, self.ramp.no_data(), self.view_mode);
        self.sink.apply(&update);

        self.labels = label_points(dataset, &encoding, self.view_mode, &self.sink);
        self.sink.set_labels(self.labels.clone());
        self.encoding = Some(encoding);
    }

    /// Hover query result from the rendering side.
    pub fn set_hovered(&mut self, code: Option<&str>) {
        self.sink.set_hovered(code);
    }

    /// Info panel content for the hovered country.
    pub fn hovered_info(&self) -> Option<CountryInfo> {
        let code = self.sink.hovered_country()?;
        self.dataset.as_ref()?.country_info(code, self.year)
    }
}
