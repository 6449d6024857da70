use hp_hist::{DATA_SENTINEL, Histogram};
use hp_viz::comparison::{ComparisonArtifact, LegendSymbol, LegendTarget};
use hp_viz::{RatioPanel, RatioType};

use crate::RenderError;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::header::draw_experiment_header;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::{Pad, PlotArea};
use crate::plots::axes_draw::{AxisText, draw_axes};
use crate::primitives::*;

/// Marker radius in pixels per unit of ROOT marker size.
const MARKER_RADIUS: f64 = 2.8;
const SIGNAL_LINE_WIDTH: f64 = 2.5;
const METRIC_LINE_WIDTH: f64 = 3.0;

/// Pixel mapping of one frame.
struct Frame<'a> {
    area: PlotArea,
    x: &'a Axis,
    y: &'a Axis,
}

impl Frame<'_> {
    fn px(&self, v: f64) -> f64 {
        self.x.data_to_pixel(v, self.area.left, self.area.right())
    }

    /// Values far outside the range are pulled in so coordinates stay
    /// finite; the clip path hides them either way.
    fn py(&self, v: f64) -> f64 {
        let v = if self.y.log {
            v.clamp(self.y.min * 1e-3, self.y.max * 1e3)
        } else {
            let span = self.y.max - self.y.min;
            v.clamp(self.y.min - span, self.y.max + span)
        };
        self.y.data_to_pixel(v, self.area.bottom(), self.area.top)
    }

    fn bin_px(&self, edges: &[f64], i: usize) -> (f64, f64) {
        (self.px(edges[i - 1]), self.px(edges[i]))
    }

    /// Rectangle covering `[lo, hi]` in bin `i`.
    fn bin_rect(&self, edges: &[f64], i: usize, lo: f64, hi: f64) -> (f64, f64, f64, f64) {
        let (x0, x1) = self.bin_px(edges, i);
        let (y_lo, y_hi) = (self.py(lo), self.py(hi));
        (x0, y_hi, x1 - x0, y_lo - y_hi)
    }

    /// Outline of a histogram drawn as a step line.
    fn step_points(&self, edges: &[f64], h: &Histogram) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(2 * h.n_bins());
        for i in 1..=h.n_bins() {
            let (x0, x1) = self.bin_px(edges, i);
            let y = self.py(h.bin_content(i));
            points.push((x0, y));
            points.push((x1, y));
        }
        points
    }
}

/// Render a comparison artifact to an SVG string.
pub fn render(artifact: &ComparisonArtifact, config: &VizConfig) -> crate::Result<String> {
    let edges = &artifact.bin_edges;
    if edges.len() < 2 {
        return Err(RenderError::Layout("comparison artifact has no bins".into()));
    }
    let (w, h) = (artifact.canvas.width as f64, artifact.canvas.height as f64);
    if w <= 0.0 || h <= 0.0 {
        return Err(RenderError::Layout(format!("canvas size {w}x{h}")));
    }

    let mut canvas = Canvas::new(w, h, config.font.family.clone());
    let main = Pad::from_spec(w, h, &artifact.canvas.main);
    let lower = match (&artifact.canvas.ratio, &artifact.ratio) {
        (Some(spec), Some(panel)) => Some((Pad::from_spec(w, h, spec), panel)),
        _ => None,
    };

    let band_pattern = FillPattern::from_root(artifact.style.error_fill);
    let band_color = config.colors.band.with_alpha(artifact.style.error_alpha);

    // --- Axes ---
    let axes = &artifact.axes;
    let mut x_axis = if axes.xticks_int {
        Axis::per_bin(edges)
    } else {
        Axis::linear(axes.x_min, axes.x_max, 8)
    };
    if let Some(labels) = &axes.bin_labels {
        x_axis = x_axis.with_bin_labels(edges, labels);
    }
    let y_axis = if axes.logy {
        Axis::log(axes.y_min, axes.y_max)
    } else {
        Axis::linear(axes.y_min, axes.y_max, 7)
    }
    .with_label(&axes.y_title);

    let (x_main, main_text) = if lower.is_some() {
        let text = AxisText {
            x_label: 0.0,
            y_label: main.text_px(0.045),
            x_title: 0.0,
            y_title: main.text_px(0.055),
            x_label_offset: 0.0,
            y_title_offset: main.frame.left * 0.62,
        };
        (x_axis.clone().without_tick_labels(), text)
    } else {
        let text = AxisText {
            x_label: main.text_px(0.045),
            y_label: main.text_px(0.045),
            x_title: main.text_px(0.05),
            y_title: main.text_px(0.05),
            x_label_offset: x_label_offset(&main, axes.xlabel_offset),
            y_title_offset: main.frame.left * 0.62,
        };
        (x_axis.clone().with_label(&axes.x_title), text)
    };

    // --- Main panel ---
    let frame = Frame { area: main.frame, x: &x_main, y: &y_axis };
    canvas.push_clip(frame.area.left, frame.area.top, frame.area.width, frame.area.height);
    draw_stack(&mut canvas, &frame, artifact)?;
    draw_total_band(&mut canvas, &frame, edges, &artifact.total, &band_pattern, band_color);
    for signal in &artifact.signals {
        let color = Color::from_artifact(&signal.color)?;
        let style = LineStyle::from_root(artifact.style.sig_line_style, color, SIGNAL_LINE_WIDTH);
        canvas.polyline(&frame.step_points(edges, &signal.histogram), &style);
    }
    draw_data(&mut canvas, &frame, &artifact.data, artifact.style.marker_size, config);
    canvas.pop_clip();

    draw_axes(&mut canvas, &main.frame, &x_main, &y_axis, &main_text, config);

    let entries = legend_entries(artifact, &band_pattern, band_color, config)?;
    draw_legend(&mut canvas, &main, &artifact.legend.frame, &entries, config.font.scale);
    draw_experiment_header(&mut canvas, &main, &artifact.labels, config);

    // --- Lower panel ---
    if let Some((pad, panel)) = lower {
        let x_lower = x_axis.with_label(&axes.x_title);
        let y_lower = Axis::linear(panel.y_min, panel.y_max, 4).with_label(&panel.y_title);
        let frame = Frame { area: pad.frame, x: &x_lower, y: &y_lower };

        canvas.push_clip(frame.area.left, frame.area.top, frame.area.width, frame.area.height);
        draw_lower_panel(&mut canvas, &frame, edges, panel, artifact, &band_pattern, band_color, config)?;
        let (x0, x1) = (frame.area.left, frame.area.right());
        let y_ref = frame.py(panel.reference_line);
        canvas.line(x0, y_ref, x1, y_ref, &LineStyle::solid(config.colors.reference_line, 1.0));
        canvas.pop_clip();

        let text = AxisText {
            x_label: pad.text_px(axes.xlabel_size.unwrap_or(0.12)),
            y_label: pad.text_px(0.12),
            x_title: pad.text_px(0.15),
            y_title: pad.text_px(0.12),
            x_label_offset: x_label_offset(&pad, axes.xlabel_offset),
            y_title_offset: pad.frame.left * 0.62,
        };
        draw_axes(&mut canvas, &pad.frame, &x_lower, &y_lower, &text, config);
    }

    tracing::debug!(
        width = w,
        height = h,
        layers = artifact.stack.len(),
        signals = artifact.signals.len(),
        "rendered comparison plot"
    );
    Ok(canvas.finish_svg())
}

/// Gap below the frame for x tick labels; `offset` is a pad fraction.
fn x_label_offset(pad: &Pad, offset: Option<f64>) -> f64 {
    offset.unwrap_or(0.005) * pad.area.height.min(pad.area.width) + 4.0
}

/// Backgrounds stacked bottom to top, bin by bin.
fn draw_stack(canvas: &mut Canvas, frame: &Frame, artifact: &ComparisonArtifact) -> crate::Result<()> {
    let edges = &artifact.bin_edges;
    let n = edges.len() - 1;
    let border = artifact.style.histo_border;
    let mut cumulative = vec![0.0_f64; n];
    let mut outlines = Vec::new();

    for layer in &artifact.stack {
        let color = Color::from_artifact(&layer.color)?;
        let mut top_edge = Vec::with_capacity(2 * n);
        for (bi, cum) in cumulative.iter_mut().enumerate() {
            let i = bi + 1;
            let content = layer.histogram.bin_content(i);
            let (base, top) = (*cum, *cum + content);
            if content > 0.0 {
                let (x, y, w, h) = frame.bin_rect(edges, i, base, top);
                canvas.rect(x, y, w, h, &Style::filled(color));
            }
            let (x0, x1) = frame.bin_px(edges, i);
            let y = frame.py(top);
            top_edge.push((x0, y));
            top_edge.push((x1, y));
            *cum = top;
        }
        outlines.push(top_edge);
    }

    if border > 0.0 {
        let style = LineStyle::solid(Color::BLACK.with_alpha(0.3), border);
        for outline in &outlines {
            canvas.polyline(outline, &style);
        }
    }
    Ok(())
}

/// Total prediction uncertainty: content ± error per bin.
fn draw_total_band(
    canvas: &mut Canvas,
    frame: &Frame,
    edges: &[f64],
    total: &Histogram,
    pattern: &FillPattern,
    color: Color,
) {
    for i in 1..=total.n_bins() {
        let (c, e) = (total.bin_content(i), total.bin_error(i));
        if e <= 0.0 {
            continue;
        }
        let (x, y, w, h) = frame.bin_rect(edges, i, c - e, c + e);
        canvas.fill_rect(x, y, w, h, pattern, color);
    }
}

/// Data points with vertical error bars; empty bins are not drawn.
fn draw_data(
    canvas: &mut Canvas,
    frame: &Frame,
    data: &Histogram,
    marker_size: f64,
    config: &VizConfig,
) {
    let marker = MarkerStyle { size: marker_size * MARKER_RADIUS, color: config.colors.data };
    let line = LineStyle::solid(config.colors.data, 1.5);
    for i in 1..=data.n_bins() {
        let (c, e) = (data.bin_content(i), data.bin_error(i));
        if c <= 0.0 {
            continue;
        }
        draw_point(canvas, frame, data.bin_center(i), c, e, &marker, &line);
    }
}

fn draw_point(
    canvas: &mut Canvas,
    frame: &Frame,
    x: f64,
    y: f64,
    err: f64,
    marker: &MarkerStyle,
    line: &LineStyle,
) {
    let px = frame.px(x);
    if err > 0.0 {
        canvas.error_bar(px, frame.py(y - err), frame.py(y + err), 0.0, line);
    }
    canvas.marker(px, frame.py(y), marker);
}

#[allow(clippy::too_many_arguments)]
fn draw_lower_panel(
    canvas: &mut Canvas,
    frame: &Frame,
    edges: &[f64],
    panel: &RatioPanel,
    artifact: &ComparisonArtifact,
    band_pattern: &FillPattern,
    band_color: Color,
    config: &VizConfig,
) -> crate::Result<()> {
    match panel.kind {
        RatioType::Ratio => {
            draw_total_band(canvas, frame, edges, &panel.band, band_pattern, band_color);
            if let Some(points) = &panel.points {
                let size = artifact.style.marker_size * MARKER_RADIUS;
                let marker = MarkerStyle { size, color: config.colors.data };
                let line = LineStyle::solid(config.colors.data, 1.5);
                for i in 1..=points.n_bins() {
                    let c = points.bin_content(i);
                    if c <= DATA_SENTINEL {
                        continue;
                    }
                    let x = points.bin_center(i);
                    draw_point(canvas, frame, x, c, points.bin_error(i), &marker, &line);
                }
            }
        }
        RatioType::SoverB | RatioType::Signif => {
            let color = match &artifact.style.metric_color {
                Some(c) => Color::from_artifact(c)?,
                None => config.colors.data,
            };
            let style = LineStyle::solid(color, METRIC_LINE_WIDTH);
            canvas.polyline(&frame.step_points(edges, &panel.band), &style);
        }
    }
    Ok(())
}

fn legend_entries(
    artifact: &ComparisonArtifact,
    band_pattern: &FillPattern,
    band_color: Color,
    config: &VizConfig,
) -> crate::Result<Vec<LegendEntry>> {
    let style = &artifact.style;
    let mut out = Vec::with_capacity(artifact.legend.entries.len());
    for entry in &artifact.legend.entries {
        let color = match &entry.color {
            Some(c) => Color::from_artifact(c)?,
            None => config.colors.data,
        };
        let kind = match (entry.target, entry.symbol) {
            (LegendTarget::Data, _) | (_, LegendSymbol::Lp) => LegendKind::MarkerWithError {
                marker: MarkerStyle { size: style.marker_size * MARKER_RADIUS, color },
                line: LineStyle::solid(color, 1.5),
            },
            (LegendTarget::Total, _) => LegendKind::Fill {
                pattern: band_pattern.clone(),
                color: band_color,
                border: None,
            },
            (_, LegendSymbol::L) => {
                LegendKind::Line(LineStyle::from_root(style.sig_line_style, color, SIGNAL_LINE_WIDTH))
            }
            (_, LegendSymbol::F) => LegendKind::Fill {
                pattern: FillPattern::Solid,
                color,
                border: (style.histo_border > 0.0)
                    .then(|| LineStyle::solid(Color::BLACK.with_alpha(0.3), style.histo_border)),
            },
        };
        out.push(LegendEntry { label: entry.label.clone(), kind });
    }
    Ok(out)
}
