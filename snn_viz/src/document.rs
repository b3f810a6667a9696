//! Result document written by a validation run.
//!
//! The producer serializes with PascalCase member names and stores the spike
//! train as a map keyed by the stringified spike time. Both are wire details:
//! after parsing, spikes are plain `(time, polarity)` pairs sorted by time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::VizError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionEvent {
    #[serde(rename = "TStart", alias = "tStart")]
    pub t_start: f64,
    #[serde(rename = "TEnd", alias = "tEnd")]
    pub t_end: f64,
    #[serde(rename = "PredictionResult", alias = "predictionResult")]
    pub prediction_result: bool,
    #[serde(rename = "Label", alias = "label")]
    pub label: bool,
}

impl PredictionEvent {
    pub fn new(t_start: f64, t_end: f64, prediction_result: bool, label: bool) -> Self {
        Self {
            t_start,
            t_end,
            prediction_result,
            label,
        }
    }

    pub fn span(&self) -> f64 {
        self.t_end - self.t_start
    }
}

/// One encoded spike. `positive` is the polarity flag of the encoder.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Spike {
    pub time: f64,
    pub positive: bool,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "Errors", alias = "errors", default)]
    errors: Option<Vec<f64>>,
    #[serde(rename = "EegRaw", alias = "eegRaw")]
    eeg_raw: Vec<f64>,
    #[serde(rename = "EegLabelsRaw", alias = "eegLabelsRaw", default)]
    eeg_labels_raw: Option<Vec<f64>>,
    #[serde(rename = "EcgSignalSpikesTrain", alias = "ecgSignalSpikesTrain")]
    spikes_train: BTreeMap<String, bool>,
    #[serde(rename = "Predictions", alias = "predictions", default)]
    predictions: Option<Vec<PredictionEvent>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultDocument {
    /// Training error per epoch.
    pub errors: Vec<f64>,
    /// Analog samples, one per tick starting at 0.
    pub eeg_raw: Vec<f64>,
    /// Tick indices of the raw label markers.
    pub eeg_labels_raw: Vec<f64>,
    /// Sorted by time, then negative before positive.
    pub spikes: Vec<Spike>,
    /// `None` when the document carries no predictions member at all.
    pub predictions: Option<Vec<PredictionEvent>>,
}

impl ResultDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, VizError> {
        let bytes = fs::read(path).map_err(|source| VizError::MissingInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(input: &[u8]) -> Result<Self, VizError> {
        let raw: RawDocument = serde_json::from_slice(input)
            .map_err(|e| VizError::MalformedDocument(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(input: &str) -> Result<Self, VizError> {
        Self::from_json_slice(input.as_bytes())
    }

    fn from_raw(raw: RawDocument) -> Result<Self, VizError> {
        Ok(Self {
            errors: raw.errors.unwrap_or_default(),
            eeg_raw: raw.eeg_raw,
            eeg_labels_raw: raw.eeg_labels_raw.unwrap_or_default(),
            spikes: parse_spike_train(raw.spikes_train)?,
            predictions: raw.predictions,
        })
    }

    /// Predictions as a slice; absence of the member is a malformed document.
    pub fn require_predictions(&self) -> Result<&[PredictionEvent], VizError> {
        self.predictions
            .as_deref()
            .ok_or_else(|| VizError::MalformedDocument("missing field `Predictions`".into()))
    }
}

fn parse_spike_train(raw: BTreeMap<String, bool>) -> Result<Vec<Spike>, VizError> {
    let mut spikes = raw
        .into_iter()
        .map(|(key, positive)| {
            let time: f64 = key.trim().parse().map_err(|_| {
                VizError::MalformedDocument(format!("spike time {key:?} is not a number"))
            })?;
            if !time.is_finite() {
                return Err(VizError::MalformedDocument(format!(
                    "spike time {key:?} is not finite"
                )));
            }
            Ok(Spike { time, positive })
        })
        .collect::<Result<Vec<_>, VizError>>()?;
    // "1" and "1.0" are distinct keys but the same time.
    spikes.sort_by_key(|s| (OrderedFloat(s.time), s.positive));
    Ok(spikes)
}
