//! Renderer-agnostic chart description and the composer that builds it.
//!
//! The encoding is fixed: spikes are green bars, fired predictions blue bars
//! below the axis, true labels red bars above it, and the analog signal a
//! faint black line on its own right-hand axis.

use serde::Serialize;
use tracing::debug;

use crate::series::{IntervalBars, RawLabelMarkers, SeriesSet, SmoothedError, SpikeCoordinates};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesColor {
    Black,
    Red,
    Green,
    Blue,
    /// Entry of the default line color cycle.
    Cycle(u8),
}

const COLOR_CYCLE: [(u8, u8, u8); 4] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
];

impl SeriesColor {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            SeriesColor::Black => (0, 0, 0),
            SeriesColor::Red => (255, 0, 0),
            SeriesColor::Green => (0, 128, 0),
            SeriesColor::Blue => (0, 0, 255),
            SeriesColor::Cycle(idx) => COLOR_CYCLE[idx as usize % COLOR_CYCLE.len()],
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AxisSide {
    /// Left axis.
    Primary,
    /// Right axis, sharing the x-axis of the primary one.
    Secondary,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Axis {
    pub side: AxisSide,
    pub label: String,
    pub tick_color: SeriesColor,
}

/// Which legend entry a layer is represented by.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayerFamily {
    Signal,
    Label,
    Spike,
    Prediction,
    Error,
}

impl LayerFamily {
    pub const LEGEND_ORDER: [LayerFamily; 4] = [
        LayerFamily::Signal,
        LayerFamily::Label,
        LayerFamily::Spike,
        LayerFamily::Prediction,
    ];

    pub fn legend_label(self) -> &'static str {
        match self {
            LayerFamily::Signal => "EEG raw",
            LayerFamily::Label => "Label",
            LayerFamily::Spike => "Spike pos/neg",
            LayerFamily::Prediction => "Prediction",
            LayerFamily::Error => "Error",
        }
    }

    pub fn color(self) -> SeriesColor {
        match self {
            LayerFamily::Signal => SeriesColor::Black,
            LayerFamily::Label => SeriesColor::Red,
            LayerFamily::Spike => SeriesColor::Green,
            LayerFamily::Prediction => SeriesColor::Blue,
            LayerFamily::Error => SeriesColor::Cycle(0),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Bars centred on each position, from 0 to `height` (negative = down).
    Bars {
        positions: Vec<f64>,
        height: f64,
        width: f64,
    },
    Line { points: Vec<(f64, f64)> },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Layer {
    pub name: String,
    pub family: LayerFamily,
    pub color: SeriesColor,
    pub opacity: f64,
    pub axis: AxisSide,
    pub shape: Shape,
}

impl Layer {
    /// `(min, max)` of the layer along x, including bar widths.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        match &self.shape {
            Shape::Bars {
                positions, width, ..
            } => {
                let half = *width / 2.0;
                extent(positions.iter().copied()).map(|(lo, hi)| (lo - half, hi + half))
            }
            Shape::Line { points } => extent(points.iter().map(|p| p.0)),
        }
    }

    /// `(min, max)` of the layer along y. Bars always include the baseline.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        match &self.shape {
            Shape::Bars {
                positions, height, ..
            } => {
                let h = *height;
                (!positions.is_empty()).then_some((h.min(0.0), h.max(0.0)))
            }
            Shape::Line { points } => extent(points.iter().map(|p| p.1)),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: SeriesColor,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    Error,
    Signal,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Figure {
    pub kind: FigureKind,
    pub title: String,
    pub x_label: String,
    pub axes: Vec<Axis>,
    /// Drawing order.
    pub layers: Vec<Layer>,
    pub legend: Vec<LegendEntry>,
}

impl Figure {
    pub fn axis(&self, side: AxisSide) -> Option<&Axis> {
        self.axes.iter().find(|a| a.side == side)
    }

    pub fn is_dual_axis(&self) -> bool {
        self.axis(AxisSide::Secondary).is_some()
    }

    pub fn layers_on(&self, side: AxisSide) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().filter(move |l| l.axis == side)
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        merge_extents(self.layers.iter().filter_map(Layer::x_extent))
    }

    pub fn y_extent(&self, side: AxisSide) -> Option<(f64, f64)> {
        merge_extents(self.layers_on(side).filter_map(Layer::y_extent))
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ChartDescription {
    pub figures: Vec<Figure>,
}

impl ChartDescription {
    pub fn figure(&self, kind: FigureKind) -> Option<&Figure> {
        self.figures.iter().find(|f| f.kind == kind)
    }
}

/// Lay out the error figure (when there is one) followed by the signal figure.
pub fn compose_chart(series: &SeriesSet) -> ChartDescription {
    let mut figures = Vec::with_capacity(2);
    if let Some(error) = series.error.as_ref() {
        figures.push(error_figure(error));
    }
    figures.push(signal_figure(series));
    ChartDescription { figures }
}

fn error_figure(error: &SmoothedError) -> Figure {
    let mut layers = vec![Layer {
        name: "Error".into(),
        family: LayerFamily::Error,
        color: SeriesColor::Cycle(0),
        opacity: 1.0,
        axis: AxisSide::Primary,
        shape: Shape::Line {
            points: error.raw_points(),
        },
    }];
    if error.smoothed.is_empty() {
        debug!(
            "Skipping smoothed error: {} epochs, window {}",
            error.raw.len(),
            error.window
        );
    } else {
        layers.push(Layer {
            name: "Error (smoothed)".into(),
            family: LayerFamily::Error,
            color: SeriesColor::Cycle(1),
            opacity: 1.0,
            axis: AxisSide::Primary,
            shape: Shape::Line {
                points: error.smoothed_points(),
            },
        });
    }

    Figure {
        kind: FigureKind::Error,
        title: "Squared error".into(),
        x_label: "Epoch".into(),
        axes: vec![Axis {
            side: AxisSide::Primary,
            label: "Error".into(),
            tick_color: SeriesColor::Black,
        }],
        layers,
        legend: Vec::new(),
    }
}

fn signal_figure(series: &SeriesSet) -> Figure {
    let mut layers = Vec::new();
    if let Some(markers) = series.raw_labels.as_ref() {
        layers.extend(raw_label_layer(markers));
    }
    if let Some(spikes) = series.spikes.as_ref() {
        layers.extend(spike_layers(spikes));
    }
    if let Some(intervals) = series.intervals.as_ref() {
        layers.extend(interval_layers(intervals));
    }
    layers.push(Layer {
        name: "EEG raw".into(),
        family: LayerFamily::Signal,
        color: SeriesColor::Black,
        opacity: 0.25,
        axis: AxisSide::Secondary,
        shape: Shape::Line {
            points: series.signal.clone(),
        },
    });

    // The legend describes event and label layers; a bare signal plot has none.
    let has_markers =
        series.spikes.is_some() || series.intervals.is_some() || series.raw_labels.is_some();
    let legend = if has_markers {
        LayerFamily::LEGEND_ORDER
            .iter()
            .map(|family| LegendEntry {
                label: family.legend_label().into(),
                color: family.color(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Figure {
        kind: FigureKind::Signal,
        title: "Test result".into(),
        x_label: "t".into(),
        axes: vec![
            Axis {
                side: AxisSide::Primary,
                label: "Spikes".into(),
                tick_color: SeriesColor::Red,
            },
            Axis {
                side: AxisSide::Secondary,
                label: "Voltage".into(),
                tick_color: SeriesColor::Black,
            },
        ],
        layers,
        legend,
    }
}

fn bar_layer(
    name: &str,
    family: LayerFamily,
    positions: &[f64],
    height: f64,
    width: f64,
) -> Option<Layer> {
    if positions.is_empty() {
        debug!("Skipping empty bar layer {name}");
        return None;
    }
    Some(Layer {
        name: name.into(),
        family,
        color: family.color(),
        opacity: 1.0,
        axis: AxisSide::Primary,
        shape: Shape::Bars {
            positions: positions.to_vec(),
            height,
            width,
        },
    })
}

fn raw_label_layer(markers: &RawLabelMarkers) -> Option<Layer> {
    bar_layer(
        "Raw labels",
        LayerFamily::Label,
        &markers.positions,
        markers.height,
        markers.width,
    )
}

fn spike_layers(spikes: &SpikeCoordinates) -> Vec<Layer> {
    [
        bar_layer(
            "Spikes positive",
            LayerFamily::Spike,
            &spikes.positive,
            spikes.height,
            spikes.width,
        ),
        bar_layer(
            "Spikes negative",
            LayerFamily::Spike,
            &spikes.negative,
            -spikes.height,
            spikes.width,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn interval_layers(intervals: &IntervalBars) -> Vec<Layer> {
    [
        bar_layer(
            "True predictions",
            LayerFamily::Prediction,
            &intervals.true_predictions,
            -intervals.height,
            intervals.span,
        ),
        bar_layer(
            "True labels",
            LayerFamily::Label,
            &intervals.true_labels,
            intervals.height,
            intervals.span,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn merge_extents(extents: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    extents.reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
}
