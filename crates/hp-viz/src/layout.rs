//! Placement rules for the comparison canvas.
//!
//! All positions are fractions of the enclosing pad (NDC) and all text
//! sizes are fractions of the pad height, so the renderer can map them
//! onto any output resolution.

use serde::{Deserialize, Serialize};

use crate::options::PlotOptions;

/// Height fraction of the canvas given to the bottom panel.
pub const RATIO_PAD_FRACTION: f64 = 0.3;

/// Pad margins as fractions of the pad size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// A pad occupying `[y_low, y_high]` of the canvas height (full width).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadSpec {
    /// Bottom edge, fraction of the canvas height.
    pub y_low: f64,
    /// Top edge, fraction of the canvas height.
    pub y_high: f64,
    /// Frame inset inside the pad.
    pub margins: Margins,
}

/// Canvas size in pixels and its pads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Pad holding the stack, data and legend.
    pub main: PadSpec,
    /// Lower pad, present when the ratio panel is drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<PadSpec>,
}

impl CanvasSpec {
    /// 1000×800 (900×800 with a bottom panel), times `can_scale`, width
    /// divided by `can_ratio`. With a bottom panel the canvas is split 70/30.
    pub fn decide(opts: &PlotOptions) -> Self {
        let scale = opts.can_scale;
        let mut width = if opts.plot_ratio { 900.0 * scale } else { 1000.0 * scale };
        let height = 800.0 * scale;
        if let Some(r) = opts.can_ratio
            && r > 0.0
        {
            width /= r;
        }

        let (main, ratio) = if opts.plot_ratio {
            (
                PadSpec {
                    y_low: RATIO_PAD_FRACTION,
                    y_high: 1.0,
                    margins: Margins { top: 0.08, bottom: 0.0, left: 0.12, right: 0.05 },
                },
                Some(PadSpec {
                    y_low: 0.0,
                    y_high: RATIO_PAD_FRACTION,
                    margins: Margins { top: 0.0, bottom: 0.45, left: 0.12, right: 0.05 },
                }),
            )
        } else {
            (
                PadSpec {
                    y_low: 0.0,
                    y_high: 1.0,
                    margins: Margins { top: 0.05, bottom: 0.16, left: 0.16, right: 0.05 },
                },
                None,
            )
        };

        Self { width: width as u32, height: height as u32, main, ratio }
    }
}

/// Legend box and text size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendBox {
    /// Lower-left corner, pad coordinates.
    pub x1: f64,
    /// Lower-left corner, pad coordinates.
    pub y1: f64,
    /// Upper-right corner, pad coordinates.
    pub x2: f64,
    /// Upper-right corner, pad coordinates.
    pub y2: f64,
    /// Entry columns.
    pub ncols: usize,
    /// Text size as a fraction of the pad.
    pub text_size: f64,
}

impl LegendBox {
    /// Default box depends on the bottom panel and the column count;
    /// `leg_pos` replaces the box, yields shrink the text, `leg_textsize`
    /// wins over everything.
    pub fn decide(opts: &PlotOptions) -> Self {
        let two_cols = opts.leg_ncols == 2;
        let (mut x1, mut y1, mut x2, mut y2, mut text_size) = match (opts.plot_ratio, two_cols) {
            (true, false) => (0.61, 0.3, 0.92, 0.90, 0.045),
            (true, true) => (0.43, 0.55, 0.94, 0.90, 0.045),
            (false, false) => (0.61, 0.5, 0.98, 0.93, 0.038),
            (false, true) => (0.48, 0.65, 0.94, 0.93, 0.034),
        };
        if let Some([a, b, c, d]) = opts.leg_pos {
            (x1, y1, x2, y2) = (a, b, c, d);
        }
        if opts.leg_put_nevts {
            text_size = 0.03;
        }
        if let Some(ts) = opts.leg_textsize {
            text_size = ts;
        }
        Self { x1, y1, x2, y2, ncols: opts.leg_ncols.max(1), text_size }
    }
}

/// Experiment label, energy/luminosity line and caption lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBlock {
    /// Anchor of the first line.
    pub x: f64,
    /// Baseline of the first line.
    pub y: f64,
    /// Vertical step between lines.
    pub dy: f64,
    /// Size of the energy/luminosity and caption lines.
    pub text_size: f64,
    /// Size of the experiment label line.
    pub experiment_size: f64,
    /// Horizontal offset of the status text after the experiment name.
    pub status_dx: f64,
    /// Experiment name as built; renderers may substitute their own.
    pub experiment: String,
    /// Empty when the plot is labelled with the experiment name only.
    pub status: String,
    /// `√s = 13 TeV, L fb⁻¹`.
    pub energy_lumi: String,
    /// Free-text lines below the luminosity.
    pub captions: Vec<String>,
}

impl LabelBlock {
    /// Position and sizes depend on whether a lower panel is drawn; the
    /// status is dropped when it repeats the experiment name.
    pub fn decide(opts: &PlotOptions, experiment: &str) -> Self {
        let (x, y, dy, text_size) =
            if opts.plot_ratio { (0.15, 0.84, 0.07, 0.052) } else { (0.19, 0.87, 0.06, 0.043) };
        let experiment_size = if opts.plot_ratio { 0.068 } else { 0.052 };
        let status_dx = 0.132 * opts.can_ratio.unwrap_or(1.0);
        let status = if opts.atlas_label == experiment {
            String::new()
        } else {
            opts.atlas_label.clone()
        };
        Self {
            x,
            y,
            dy,
            text_size,
            experiment_size,
            status_dx,
            experiment: experiment.to_string(),
            status,
            energy_lumi: format!("\u{221A}s = 13 TeV, {:.1} fb\u{207B}\u{00B9}", opts.lumi),
            captions: opts.plot_labels.clone(),
        }
    }

    /// Baseline of line `i` (0 = experiment label, 1 = energy/luminosity,
    /// 2.. = captions).
    pub fn line_y(&self, i: usize) -> f64 {
        self.y - i as f64 * self.dy
    }
}

/// Data marker size: 1.7 with a bottom panel, 2.0 without, scaled with the
/// canvas; `m_size` overrides.
pub fn marker_size(opts: &PlotOptions) -> f64 {
    opts.m_size.unwrap_or(if opts.plot_ratio { 1.7 } else { 2.0 } * opts.can_scale)
}
