//! Derive plottable coordinate sets from a result document.

use ndarray::ArrayView1;
use serde::Serialize;
use tracing::debug;

use crate::document::{PredictionEvent, ResultDocument, Spike};
use crate::{VizConfig, VizError};

/// Spike times split by polarity. Bars go up for positive, down for negative.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SpikeCoordinates {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
    pub height: f64,
    pub width: f64,
}

impl SpikeCoordinates {
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Start times of the prediction windows that fired and of those that held a
/// true event. Every bar is `span` wide.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct IntervalBars {
    pub true_predictions: Vec<f64>,
    pub true_labels: Vec<f64>,
    pub height: f64,
    pub span: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RawLabelMarkers {
    pub positions: Vec<f64>,
    pub height: f64,
    pub width: f64,
}

/// Per-epoch error and its moving average.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SmoothedError {
    pub raw: Vec<f64>,
    /// Empty when there are fewer epochs than `window`.
    pub smoothed: Vec<f64>,
    pub window: usize,
}

impl SmoothedError {
    pub fn new(raw: Vec<f64>, window: usize) -> Self {
        let smoothed = moving_average(&raw, window);
        Self {
            raw,
            smoothed,
            window,
        }
    }

    /// Epochs are numbered from 1.
    pub fn raw_points(&self) -> Vec<(f64, f64)> {
        self.raw
            .iter()
            .enumerate()
            .map(|(i, &e)| ((i + 1) as f64, e))
            .collect()
    }

    /// Each average sits on the centre epoch of its window.
    pub fn smoothed_points(&self) -> Vec<(f64, f64)> {
        let offset = 1.0 + (self.window as f64 - 1.0) / 2.0;
        self.smoothed
            .iter()
            .enumerate()
            .map(|(i, &e)| (i as f64 + offset, e))
            .collect()
    }
}

/// Everything the composer needs, already in plot coordinates.
///
/// Event sets are `None` when events are switched off; `error` is `None` when
/// the error figure is off or the run has fewer than two epochs.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SeriesSet {
    pub signal: Vec<(f64, f64)>,
    pub spikes: Option<SpikeCoordinates>,
    pub intervals: Option<IntervalBars>,
    pub raw_labels: Option<RawLabelMarkers>,
    pub error: Option<SmoothedError>,
}

pub fn extract_series(
    document: &ResultDocument,
    config: &VizConfig,
) -> Result<SeriesSet, VizError> {
    config.validate()?;

    let (spikes, intervals) = if config.show_events {
        let intervals = interval_bars(
            document.require_predictions()?,
            config.interval_bar_height,
        )?;
        let spikes = partition_spikes(
            &document.spikes,
            config.spike_bar_height,
            config.spike_bar_width,
        );
        (Some(spikes), Some(intervals))
    } else {
        debug!("Events disabled, extracting signal only");
        (None, None)
    };

    let raw_labels = config.show_raw_labels.then(|| RawLabelMarkers {
        positions: document.eeg_labels_raw.clone(),
        height: config.raw_label_bar_height,
        width: config.spike_bar_width,
    });

    let error = if !config.show_error_figure {
        None
    } else if document.errors.len() < 2 {
        debug!(
            "Skipping error figure: {} epoch(s) recorded",
            document.errors.len()
        );
        None
    } else {
        Some(SmoothedError::new(
            document.errors.clone(),
            config.error_smoothing_window,
        ))
    };

    Ok(SeriesSet {
        signal: signal_points(&document.eeg_raw),
        spikes,
        intervals,
        raw_labels,
        error,
    })
}

fn signal_points(samples: &[f64]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .enumerate()
        .map(|(tick, &v)| (tick as f64, v))
        .collect()
}

pub fn partition_spikes(spikes: &[Spike], height: f64, width: f64) -> SpikeCoordinates {
    let (positive, negative): (Vec<&Spike>, Vec<&Spike>) =
        spikes.iter().partition(|s| s.positive);
    SpikeCoordinates {
        positive: positive.into_iter().map(|s| s.time).collect(),
        negative: negative.into_iter().map(|s| s.time).collect(),
        height,
        width,
    }
}

/// The span of the first prediction is the width of every interval bar.
pub fn interval_bars(
    predictions: &[PredictionEvent],
    height: f64,
) -> Result<IntervalBars, VizError> {
    let first = predictions.first().ok_or(VizError::EmptyPredictions)?;
    let span = first.span();
    if !span.is_finite() || span < 0.0 {
        return Err(VizError::MalformedDocument(format!(
            "prediction window [{}, {}] has no valid span",
            first.t_start, first.t_end
        )));
    }
    Ok(IntervalBars {
        true_predictions: predictions
            .iter()
            .filter(|p| p.prediction_result)
            .map(|p| p.t_start)
            .collect(),
        true_labels: predictions
            .iter()
            .filter(|p| p.label)
            .map(|p| p.t_start)
            .collect(),
        height,
        span,
    })
}

/// Simple moving average without edge padding: `len - window + 1` values, or
/// none when the input is shorter than the window.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || data.len() < window {
        return Vec::new();
    }
    let scale = window as f64;
    ArrayView1::from(data)
        .windows(window)
        .into_iter()
        .map(|w| w.sum() / scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(time: f64, positive: bool) -> Spike {
        Spike { time, positive }
    }

    fn document(errors: Vec<f64>, predictions: Option<Vec<PredictionEvent>>) -> ResultDocument {
        ResultDocument {
            errors,
            eeg_raw: vec![0.1, 0.2, 0.15],
            eeg_labels_raw: vec![1.0, 2.0],
            spikes: vec![spike(1.0, true), spike(2.0, false)],
            predictions,
        }
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let spikes = vec![
            spike(0.5, false),
            spike(1.0, true),
            spike(1.5, true),
            spike(4.0, false),
            spike(9.0, true),
        ];
        let coords = partition_spikes(&spikes, 0.3, 3.0);
        assert_eq!(coords.len(), spikes.len());
        assert_eq!(coords.positive, vec![1.0, 1.5, 9.0]);
        assert_eq!(coords.negative, vec![0.5, 4.0]);
        assert!(coords.positive.iter().all(|t| !coords.negative.contains(t)));
    }

    #[test]
    fn test_span_comes_from_first_prediction() {
        let predictions = vec![
            PredictionEvent::new(10.0, 12.0, true, false),
            PredictionEvent::new(12.0, 20.0, true, true),
            PredictionEvent::new(20.0, 21.0, false, true),
        ];
        let bars = interval_bars(&predictions, 0.25).unwrap();
        assert_eq!(bars.span, 2.0);
        assert_eq!(bars.true_predictions, vec![10.0, 12.0]);
        assert_eq!(bars.true_labels, vec![12.0, 20.0]);
    }

    #[test]
    fn test_empty_predictions_error() {
        let err = interval_bars(&[], 0.25).unwrap_err();
        assert!(matches!(err, VizError::EmptyPredictions));
    }

    #[test]
    fn test_reversed_window_is_malformed() {
        let predictions = vec![PredictionEvent::new(5.0, 4.0, true, true)];
        assert!(matches!(
            interval_bars(&predictions, 0.25),
            Err(VizError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_moving_average_length_law() {
        let data: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let smoothed = moving_average(&data, 10);
        assert_eq!(smoothed.len(), 16);
        assert!((smoothed[0] - 4.5).abs() < 1e-12);
        assert!((smoothed[15] - 19.5).abs() < 1e-12);

        assert_eq!(moving_average(&data[..10], 10), vec![4.5]);
        assert!(moving_average(&data[..9], 10).is_empty());
        assert!(moving_average(&data[..2], 10).is_empty());
        assert_eq!(moving_average(&data[..3], 1), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_smoothed_points_are_centred() {
        let error = SmoothedError::new((0..12).map(|i| i as f64).collect(), 10);
        assert_eq!(error.smoothed.len(), 3);
        let points = error.smoothed_points();
        assert_eq!(points[0].0, 5.5);
        assert_eq!(points[2].0, 7.5);
        assert_eq!(error.raw_points()[0], (1.0, 0.0));
        assert_eq!(error.raw_points()[11], (12.0, 11.0));
    }

    #[test]
    fn test_scenario_extraction() {
        let doc = document(
            Vec::new(),
            Some(vec![PredictionEvent::new(1.0, 1.5, true, false)]),
        );
        let series = extract_series(&doc, &VizConfig::default()).unwrap();
        let spikes = series.spikes.unwrap();
        assert_eq!(spikes.positive, vec![1.0]);
        assert_eq!(spikes.negative, vec![2.0]);
        let intervals = series.intervals.unwrap();
        assert_eq!(intervals.span, 0.5);
        assert_eq!(intervals.true_predictions, vec![1.0]);
        assert!(intervals.true_labels.is_empty());
        assert_eq!(series.signal, vec![(0.0, 0.1), (1.0, 0.2), (2.0, 0.15)]);
        assert!(series.raw_labels.is_none());
    }

    #[test]
    fn test_error_skipped_below_two_epochs() {
        let predictions = Some(vec![PredictionEvent::new(0.0, 1.0, false, false)]);
        for errors in [vec![], vec![0.7]] {
            let series =
                extract_series(&document(errors, predictions.clone()), &VizConfig::default())
                    .unwrap();
            assert!(series.error.is_none());
        }
        let series = extract_series(
            &document(vec![0.7, 0.6], predictions),
            &VizConfig::default(),
        )
        .unwrap();
        let error = series.error.unwrap();
        assert_eq!(error.raw.len(), 2);
        assert!(error.smoothed.is_empty());
    }

    #[test]
    fn test_error_figure_switch() {
        let config = VizConfig {
            show_error_figure: false,
            ..VizConfig::default()
        };
        let doc = document(
            vec![1.0; 20],
            Some(vec![PredictionEvent::new(0.0, 1.0, false, false)]),
        );
        assert!(extract_series(&doc, &config).unwrap().error.is_none());
    }

    #[test]
    fn test_signal_only_ignores_predictions() {
        let config = VizConfig {
            show_events: false,
            ..VizConfig::default()
        };
        let series = extract_series(&document(Vec::new(), None), &config).unwrap();
        assert!(series.spikes.is_none());
        assert!(series.intervals.is_none());
        assert_eq!(series.signal.len(), 3);
    }

    #[test]
    fn test_missing_predictions_with_events() {
        let err = extract_series(&document(Vec::new(), None), &VizConfig::default()).unwrap_err();
        assert!(matches!(err, VizError::MalformedDocument(_)));
    }

    #[test]
    fn test_raw_label_markers_use_spike_width() {
        let config = VizConfig {
            show_raw_labels: true,
            spike_bar_width: 5.0,
            ..VizConfig::default()
        };
        let doc = document(
            Vec::new(),
            Some(vec![PredictionEvent::new(0.0, 1.0, false, false)]),
        );
        let markers = extract_series(&doc, &config).unwrap().raw_labels.unwrap();
        assert_eq!(markers.positions, vec![1.0, 2.0]);
        assert_eq!(markers.width, 5.0);
        assert_eq!(markers.height, 1.0);
    }
}
