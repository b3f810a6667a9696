//! Series extraction and chart composition for spiking-network run results.
//!
//! A run produces one JSON result document holding the raw analog signal, the
//! encoded spike train, the per-window predictions and the training error per
//! epoch. [`build_chart`] turns that document into a renderer-agnostic
//! [`ChartDescription`]: an optional error figure followed by the dual-axis
//! signal figure.
//!
//! ```
//! use snn_viz::{build_chart, ResultDocument, VizConfig};
//!
//! let doc = ResultDocument::from_json_str(
//!     r#"{
//!         "Errors": [],
//!         "EegRaw": [0.1, 0.2, 0.15],
//!         "EcgSignalSpikesTrain": {"1.0": true, "2.0": false},
//!         "Predictions": [
//!             {"TStart": 1.0, "TEnd": 1.5, "PredictionResult": true, "Label": false}
//!         ]
//!     }"#,
//! )
//! .unwrap();
//!
//! let chart = build_chart(&doc, &VizConfig::default()).unwrap();
//! assert_eq!(chart.figures.len(), 1);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chart;
pub mod document;
pub mod series;

pub use chart::{
    compose_chart, Axis, AxisSide, ChartDescription, Figure, FigureKind, Layer, LayerFamily,
    LegendEntry, SeriesColor, Shape,
};
pub use document::{PredictionEvent, ResultDocument, Spike};
pub use series::{
    extract_series, moving_average, IntervalBars, RawLabelMarkers, SeriesSet, SmoothedError,
    SpikeCoordinates,
};

#[derive(Error, Debug)]
pub enum VizError {
    #[error("cannot read result document {}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed result document: {0}")]
    MalformedDocument(String),
    #[error("interval bars requested but the document has no predictions")]
    EmptyPredictions,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Knobs that distinguish the plot variants of a run.
///
/// The defaults reproduce the validation plot: 3-unit spike bars, no raw-label
/// markers, error figure on, 10-epoch smoothing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VizConfig {
    pub spike_bar_width: f64,
    pub spike_bar_height: f64,
    pub interval_bar_height: f64,
    pub raw_label_bar_height: f64,
    pub show_raw_labels: bool,
    pub show_error_figure: bool,
    pub error_smoothing_window: usize,
    /// Spikes, predictions and labels. Off gives the signal-only plot.
    pub show_events: bool,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            spike_bar_width: 3.0,
            spike_bar_height: 0.3,
            interval_bar_height: 0.25,
            raw_label_bar_height: 1.0,
            show_raw_labels: false,
            show_error_figure: true,
            error_smoothing_window: 10,
            show_events: true,
        }
    }
}

impl VizConfig {
    pub fn validate(&self) -> Result<(), VizError> {
        if self.error_smoothing_window == 0 {
            return Err(VizError::InvalidConfig(
                "error smoothing window must be at least 1".into(),
            ));
        }
        let geometry = [
            ("spike_bar_width", self.spike_bar_width),
            ("spike_bar_height", self.spike_bar_height),
            ("interval_bar_height", self.interval_bar_height),
            ("raw_label_bar_height", self.raw_label_bar_height),
        ];
        for (name, value) in geometry {
            if !value.is_finite() || value < 0.0 {
                return Err(VizError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Run the extractor and the composer on one document.
pub fn build_chart(
    document: &ResultDocument,
    config: &VizConfig,
) -> Result<ChartDescription, VizError> {
    let series = extract_series(document, config)?;
    Ok(compose_chart(&series))
}
