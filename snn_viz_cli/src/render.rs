use std::panic;
use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::chart::{ChartContext, DualCoordChartContext};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters_backend::{
    text_anchor, BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind,
};
use snn_viz::{
    AxisSide, ChartDescription, Figure, FigureKind, Layer, LegendEntry, SeriesColor, Shape,
};

type Plane = Cartesian2d<RangedCoordf64, RangedCoordf64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Svg,
}

/// Where each figure of a chart lands, given the path of the main figure.
pub fn figure_path(base: &Path, kind: FigureKind) -> PathBuf {
    match kind {
        FigureKind::Signal => base.to_path_buf(),
        FigureKind::Error => {
            let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("result");
            let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
            base.with_file_name(format!("{}_error.{}", stem, ext))
        }
    }
}

/// Render every figure, turning backend panics into errors.
pub fn render_chart_guard(
    chart: &ChartDescription,
    base: &Path,
    kind: ImageKind,
    size: (u32, u32),
) -> Result<Vec<PathBuf>, String> {
    let render = || -> Result<Vec<PathBuf>, String> {
        let mut written = Vec::with_capacity(chart.figures.len());
        for figure in &chart.figures {
            let path = figure_path(base, figure.kind);
            render_figure(figure, &path, kind, size)
                .map_err(|e| format!("plotting error in {}: {}", path.display(), e))?;
            written.push(path);
        }
        Ok(written)
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn render_figure(figure: &Figure, path: &Path, kind: ImageKind, size: (u32, u32)) -> Result<()> {
    match kind {
        ImageKind::Png => {
            let backend = BitMapBackend::new(path, size);
            let root = FontSafeBackend::new(backend, true).into_drawing_area();
            draw_figure(root, figure)
        }
        ImageKind::Svg => {
            let backend = SVGBackend::new(path, size);
            let root = FontSafeBackend::new(backend, false).into_drawing_area();
            draw_figure(root, figure)
        }
    }
}

fn draw_figure<DB>(root: DrawingArea<DB, plotters::coord::Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = root;
    area.fill(&WHITE)?;

    let (x0, x1) = padded(figure.x_extent(), (0.0, 1.0));
    let (y0, y1) = padded(figure.y_extent(AxisSide::Primary), (-1.0, 1.0));
    let x_precision = tick_precision(x0, x1);

    let axis_font = FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal);
    let primary = figure.axis(AxisSide::Primary);
    let primary_label = primary.map(|a| a.label.as_str()).unwrap_or("");
    let primary_ticks = primary.map(|a| a.tick_color).unwrap_or(SeriesColor::Black);

    let mut builder = ChartBuilder::on(&area);
    builder
        .caption(&figure.title, ("sans-serif", 24).into_font())
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45);

    match figure.axis(AxisSide::Secondary) {
        None => {
            let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;
            chart
                .configure_mesh()
                .light_line_style(&TRANSPARENT)
                .x_desc(figure.x_label.as_str())
                .y_desc(primary_label)
                .x_label_formatter(&|v| format!("{:.*}", x_precision, v))
                .label_style(axis_font.clone().color(&BLACK.mix(0.85)))
                .y_label_style(axis_font.clone().color(&rgb(primary_ticks)))
                .draw()?;

            for layer in figure.layers_on(AxisSide::Primary) {
                draw_primary_layer(&mut chart, layer)?;
            }
            draw_legend(&mut chart, &figure.legend)?;
        }
        Some(secondary) => {
            builder.set_label_area_size(LabelAreaPosition::Right, 70);
            let (s0, s1) = padded(figure.y_extent(AxisSide::Secondary), (-1.0, 1.0));
            let mut chart = builder
                .build_cartesian_2d(x0..x1, y0..y1)?
                .set_secondary_coord(x0..x1, s0..s1);

            chart
                .configure_mesh()
                .light_line_style(&TRANSPARENT)
                .x_desc(figure.x_label.as_str())
                .y_desc(primary_label)
                .x_label_formatter(&|v| format!("{:.*}", x_precision, v))
                .y_label_formatter(&|v| format!("{:.2}", v))
                .label_style(axis_font.clone().color(&BLACK.mix(0.85)))
                .y_label_style(axis_font.clone().color(&rgb(primary_ticks)))
                .draw()?;
            chart
                .configure_secondary_axes()
                .y_desc(secondary.label.as_str())
                .label_style(axis_font.clone().color(&rgb(secondary.tick_color)))
                .draw()?;

            for layer in figure.layers_on(AxisSide::Primary) {
                draw_primary_layer(&mut *chart, layer)?;
            }
            for layer in figure.layers_on(AxisSide::Secondary) {
                draw_secondary_layer(&mut chart, layer)?;
            }
            draw_legend(&mut *chart, &figure.legend)?;
        }
    }

    area.present()?;
    Ok(())
}

fn draw_primary_layer<DB>(chart: &mut ChartContext<'_, DB, Plane>, layer: &Layer) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    match &layer.shape {
        Shape::Bars {
            positions,
            height,
            width,
        } => {
            chart.draw_series(bar_rectangles(positions, *height, *width, layer_style(layer, true)))?;
        }
        Shape::Line { points } => {
            chart.draw_series(LineSeries::new(points.iter().copied(), layer_style(layer, false)))?;
        }
    }
    Ok(())
}

fn draw_secondary_layer<DB>(
    chart: &mut DualCoordChartContext<'_, DB, Plane, Plane>,
    layer: &Layer,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    match &layer.shape {
        Shape::Bars {
            positions,
            height,
            width,
        } => {
            chart.draw_secondary_series(bar_rectangles(
                positions,
                *height,
                *width,
                layer_style(layer, true),
            ))?;
        }
        Shape::Line { points } => {
            chart.draw_secondary_series(LineSeries::new(
                points.iter().copied(),
                layer_style(layer, false),
            ))?;
        }
    }
    Ok(())
}

/// Bar collections have no single legend artist, so every family gets an
/// empty proxy series carrying its label and color.
fn draw_legend<'a, DB>(
    chart: &mut ChartContext<'a, DB, Plane>,
    legend: &[LegendEntry],
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    if legend.is_empty() {
        return Ok(());
    }
    for entry in legend {
        let color = rgb(entry.color);
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(entry.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], Color::stroke_width(&color, 4))
            });
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .label_font(FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal).color(&BLACK))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn bar_rectangles(
    positions: &[f64],
    height: f64,
    width: f64,
    style: ShapeStyle,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + '_ {
    let half = width / 2.0;
    positions
        .iter()
        .map(move |&x| Rectangle::new([(x - half, 0.0), (x + half, height)], style))
}

fn layer_style(layer: &Layer, filled: bool) -> ShapeStyle {
    let (r, g, b) = layer.color.rgb();
    ShapeStyle {
        color: RGBAColor(r, g, b, layer.opacity),
        filled,
        stroke_width: if filled { 1 } else { 2 },
    }
}

fn rgb(color: SeriesColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

/// Largest magnitude an axis bound may take. Keeps `hi - lo` and the padded
/// bounds finite, otherwise tick generation never terminates.
const AXIS_LIMIT: f64 = f64::MAX / 4.0;

/// Widen a data extent by 5% per side; flat or missing extents get a fallback.
fn padded(extent: Option<(f64, f64)>, fallback: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = match extent {
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() => (
            lo.clamp(-AXIS_LIMIT, AXIS_LIMIT),
            hi.clamp(-AXIS_LIMIT, AXIS_LIMIT),
        ),
        _ => return fallback,
    };
    if (hi - lo).abs() < f64::EPSILON {
        let pad = (lo.abs() * 0.05).max(1.0);
        return (lo - pad, hi + pad);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Decimals needed to tell apart ticks of a range split into about ten steps.
fn tick_precision(lo: f64, hi: f64) -> usize {
    let step = (hi - lo).abs() / 10.0;
    if !step.is_normal() {
        return 0;
    }
    (-step.log10().floor()).clamp(0.0, 6.0) as usize
}

/// Backend adapter that can draw text without any system font.
///
/// With `pixel_text` set (raster output), all text goes through the built-in
/// 5x7 pixel font. Otherwise text is delegated and the pixel font is only used
/// if the inner backend panics.
struct FontSafeBackend<DB> {
    inner: DB,
    pixel_text: bool,
}

impl<DB> FontSafeBackend<DB> {
    fn new(inner: DB, pixel_text: bool) -> Self {
        Self { inner, pixel_text }
    }
}

impl<DB: DrawingBackend> DrawingBackend for FontSafeBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        if self.pixel_text {
            return self.draw_pixel_text(text, style, pos);
        }
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        })) {
            Ok(result) => result,
            Err(_) => self.draw_pixel_text(text, style, pos),
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        if self.pixel_text {
            let (w, h) = pixel_text_size(text, pixel_scale(style.size()));
            return Ok((w as u32, h as u32));
        }
        self.inner.estimate_text_size(text, style)
    }
}

impl<DB: DrawingBackend> FontSafeBackend<DB> {
    fn draw_pixel_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.trim().is_empty() {
            return Ok(());
        }

        let scale = pixel_scale(style.size());
        let (width, height) = pixel_text_size(text, scale);
        let dx = match style.anchor().h_pos {
            text_anchor::HPos::Left => 0,
            text_anchor::HPos::Right => -width,
            text_anchor::HPos::Center => -width / 2,
        };
        let dy = match style.anchor().v_pos {
            text_anchor::VPos::Top => 0,
            text_anchor::VPos::Center => -height / 2,
            text_anchor::VPos::Bottom => -height,
        };
        let transform = style.transform();

        let mut cursor = dx;
        for ch in text.chars() {
            if let Some(rows) = pixel_glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..PIXEL_FONT_WIDTH {
                        if bits & (1 << (PIXEL_FONT_WIDTH - 1 - col)) == 0 {
                            continue;
                        }
                        let x = cursor + col as i32 * scale;
                        let y = dy + row as i32 * scale;
                        for sx in 0..scale {
                            for sy in 0..scale {
                                let (tx, ty) = transform.transform(x + sx, y + sy);
                                self.inner.draw_pixel((pos.0 + tx, pos.1 + ty), color.clone())?;
                            }
                        }
                    }
                }
            }
            cursor += scale * PIXEL_FONT_ADVANCE;
        }
        Ok(())
    }
}

const PIXEL_FONT_WIDTH: usize = 5;
const PIXEL_FONT_HEIGHT: usize = 7;
const PIXEL_FONT_ADVANCE: i32 = PIXEL_FONT_WIDTH as i32 + 1;

fn pixel_scale(font_size: f64) -> i32 {
    (font_size / PIXEL_FONT_HEIGHT as f64).round().max(1.0) as i32
}

fn pixel_text_size(text: &str, scale: i32) -> (i32, i32) {
    let chars = text.chars().count() as i32;
    let width = (chars * PIXEL_FONT_ADVANCE - 1).max(0) * scale;
    (width, PIXEL_FONT_HEIGHT as i32 * scale)
}

/// Lowercase letters are drawn as capitals.
fn pixel_glyph(ch: char) -> Option<&'static [u8; PIXEL_FONT_HEIGHT]> {
    let key = ch.to_ascii_uppercase();
    PIXEL_FONT
        .iter()
        .find(|(c, _)| *c == key)
        .map(|(_, rows)| rows)
}

#[rustfmt::skip]
const PIXEL_FONT: &[(char, [u8; PIXEL_FONT_HEIGHT])] = &[
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('B', [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
    ('C', [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
    ('D', [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('G', [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
    ('H', [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('Q', [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
    ('X', [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04]),
    ('Z', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08]),
    ('-', [0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00]),
    ('+', [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00]),
    ('/', [0x01, 0x02, 0x02, 0x04, 0x08, 0x08, 0x10]),
    ('(', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    (')', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    (':', [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00]),
    ('%', [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use snn_viz::{build_chart, ResultDocument, VizConfig};

    fn sample_chart() -> ChartDescription {
        let doc = ResultDocument::from_json_str(
            r#"{
                "Errors": [1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.05],
                "EegRaw": [0.1, 0.2, 0.15, -0.05, 0.3],
                "EcgSignalSpikesTrain": {"1.0": true, "2.0": false, "3.5": true},
                "Predictions": [
                    {"TStart": 0.0, "TEnd": 2.0, "PredictionResult": true, "Label": false},
                    {"TStart": 2.0, "TEnd": 4.0, "PredictionResult": false, "Label": true}
                ]
            }"#,
        )
        .unwrap();
        build_chart(&doc, &VizConfig::default()).unwrap()
    }

    #[test]
    fn test_figure_paths() {
        let base = Path::new("/tmp/run/val_res.png");
        assert_eq!(figure_path(base, FigureKind::Signal), base);
        assert_eq!(
            figure_path(base, FigureKind::Error),
            PathBuf::from("/tmp/run/val_res_error.png")
        );
        assert_eq!(
            figure_path(Path::new("out.svg"), FigureKind::Error),
            PathBuf::from("out_error.svg")
        );
    }

    #[test]
    fn test_padded_extents() {
        assert_eq!(padded(None, (0.0, 1.0)), (0.0, 1.0));
        assert_eq!(padded(Some((2.0, 2.0)), (0.0, 1.0)), (1.0, 3.0));
        let (lo, hi) = padded(Some((0.0, 10.0)), (0.0, 1.0));
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_padded_extents_stay_finite_at_float_limits() {
        let (lo, hi) = padded(Some((-1e308, 1e308)), (0.0, 1.0));
        assert!(lo.is_finite() && hi.is_finite());
        assert!((hi - lo).is_finite());
        assert!(lo < 0.0 && hi > 0.0);

        let (lo, hi) = padded(Some((f64::MAX, f64::MAX)), (0.0, 1.0));
        assert!((hi - lo).is_finite() && hi > lo);
    }

    #[test]
    fn test_tick_precision_follows_range() {
        assert_eq!(tick_precision(0.0, 100.0), 0);
        assert_eq!(tick_precision(-1.5, 3.5), 1);
        assert_eq!(tick_precision(0.95, 2.05), 1);
        assert_eq!(tick_precision(0.0, 0.05), 3);
        assert_eq!(tick_precision(2.0, 2.0), 0);
        assert_eq!(tick_precision(-1e308, 1e308), 0);
    }

    #[test]
    fn test_render_png_with_extreme_signal() {
        let doc = ResultDocument::from_json_str(
            r#"{
                "Errors": [0.4, 0.3],
                "EegRaw": [1e308, -1e308],
                "EcgSignalSpikesTrain": {"1.0": true},
                "Predictions": [
                    {"TStart": 0.0, "TEnd": 1.0, "PredictionResult": true, "Label": true}
                ]
            }"#,
        )
        .unwrap();
        let chart = build_chart(&doc, &VizConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("extreme.png");
        let written = render_chart_guard(&chart, &base, ImageKind::Png, (320, 200)).unwrap();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn test_pixel_font_metrics() {
        assert_eq!(pixel_scale(16.0), 2);
        assert_eq!(pixel_scale(2.0), 1);
        assert_eq!(pixel_text_size("Epoch", 1), (29, 7));
        assert_eq!(pixel_text_size("", 3), (0, 21));
        assert!(pixel_glyph('t').is_some());
        assert!(pixel_glyph('~').is_none());
    }

    #[test]
    fn test_render_svg_writes_both_figures() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("result.svg");
        let written =
            render_chart_guard(&sample_chart(), &base, ImageKind::Svg, (640, 400)).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], dir.path().join("result_error.svg"));
        assert_eq!(written[1], base);
        let svg = std::fs::read_to_string(&base).unwrap();
        assert!(svg.contains("Test result"));
        assert!(svg.contains("Voltage"));
    }

    #[test]
    fn test_render_png() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("result.png");
        let written =
            render_chart_guard(&sample_chart(), &base, ImageKind::Png, (640, 400)).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }
}
