use hp_viz::layout::LegendBox;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::Pad;
use crate::primitives::*;

/// Fraction of a column taken by the symbol.
const SYMBOL_FRACTION: f64 = 0.25;

pub struct LegendEntry {
    pub label: String,
    pub kind: LegendKind,
}

pub enum LegendKind {
    /// Filled box (`f`), optionally outlined.
    Fill { pattern: FillPattern, color: Color, border: Option<LineStyle> },
    /// Line (`l`).
    Line(LineStyle),
    /// Marker with a vertical error line (`lp`).
    MarkerWithError { marker: MarkerStyle, line: LineStyle },
}

/// Draw a frameless legend filling `frame` (pad fractions) row by row.
pub fn draw_legend(
    canvas: &mut Canvas,
    pad: &Pad,
    frame: &LegendBox,
    entries: &[LegendEntry],
    font_scale: f64,
) {
    if entries.is_empty() {
        return;
    }

    let ncols = frame.ncols.max(1);
    let nrows = entries.len().div_ceil(ncols);
    let x0 = pad.ndc_x(frame.x1);
    let y_top = pad.ndc_y(frame.y2);
    let col_w = (pad.ndc_x(frame.x2) - x0) / ncols as f64;
    let row_h = (pad.ndc_y(frame.y1) - y_top) / nrows as f64;

    let text_style = TextStyle {
        size: pad.text_px(frame.text_size) * font_scale,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let sym_w = col_w * SYMBOL_FRACTION;
    let sym_h = (row_h * 0.7).min(text_style.size * 1.2);

    for (i, entry) in entries.iter().enumerate() {
        let cx = x0 + (i % ncols) as f64 * col_w;
        let cy = y_top + (i / ncols) as f64 * row_h + row_h / 2.0;
        let sx = cx + sym_w * 0.1;
        let sw = sym_w * 0.8;

        match &entry.kind {
            LegendKind::Fill { pattern, color, border } => {
                canvas.fill_rect(sx, cy - sym_h / 2.0, sw, sym_h, pattern, *color);
                if let Some(ls) = border {
                    let (l, r, t, b) = (sx, sx + sw, cy - sym_h / 2.0, cy + sym_h / 2.0);
                    canvas.polyline(&[(l, t), (r, t), (r, b), (l, b), (l, t)], ls);
                }
            }
            LegendKind::Line(ls) => {
                canvas.line(sx, cy, sx + sw, cy, ls);
            }
            LegendKind::MarkerWithError { marker, line } => {
                let mx = sx + sw / 2.0;
                canvas.error_bar(mx, cy - sym_h / 2.0, cy + sym_h / 2.0, 0.0, line);
                canvas.marker(mx, cy, marker);
            }
        }

        canvas.text(cx + sym_w + 4.0, cy, &entry.label, &text_style);
    }
}
