use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Pixel sizes of the axis texts of one frame.
#[derive(Debug, Clone, Copy)]
pub struct AxisText {
    pub x_label: f64,
    pub y_label: f64,
    pub x_title: f64,
    pub y_title: f64,
    /// Gap between the frame and the x tick labels.
    pub x_label_offset: f64,
    /// Gap between the frame and the rotated y title baseline.
    pub y_title_offset: f64,
}

/// Draw a box frame with ticks, tick labels and axis titles.
///
/// The x title is right-aligned under the frame and the y title is
/// top-aligned along it.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    text: &AxisText,
    config: &VizConfig,
) {
    let frame_color = config.colors.frame;
    let frame_style = LineStyle::solid(frame_color, config.axes.frame_width);
    let tick_style = LineStyle::solid(frame_color, config.axes.frame_width * 0.8);

    let inward = config.axes.tick_direction == "in";
    let dir = if inward { 1.0 } else { -1.0 };
    let x_tl = config.axes.tick_length * area.height;
    let y_tl = config.axes.tick_length * area.width * 0.6;
    let scale = config.font.scale;

    // --- X axis ---
    let x_label_style = TextStyle {
        size: text.x_label * scale,
        color: frame_color,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    let label_y = area.bottom() + text.x_label_offset + if inward { 0.0 } else { x_tl };
    let x_minor: &[f64] = if config.axes.minor_ticks { &x_axis.minor_ticks } else { &[] };
    let x_ticks =
        x_axis.tick_positions.iter().map(|&v| (v, 1.0)).chain(x_minor.iter().map(|&v| (v, 0.5)));
    for (val, len) in x_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        let tl = x_tl * len;
        canvas.line(px, area.bottom(), px, area.bottom() - dir * tl, &tick_style);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top + dir * tl, &tick_style);
        }
    }
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            canvas.text(px, label_y, label, &x_label_style);
        }
    }
    for (val, label) in &x_axis.category_labels {
        let px = x_axis.data_to_pixel(*val, area.left, area.right());
        canvas.text(px, label_y, label, &x_label_style);
    }

    // --- Y axis ---
    let y_label_style = TextStyle {
        size: text.y_label * scale,
        color: frame_color,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let y_minor: &[f64] = if config.axes.minor_ticks { &y_axis.minor_ticks } else { &[] };
    let y_ticks =
        y_axis.tick_positions.iter().map(|&v| (v, 1.0)).chain(y_minor.iter().map(|&v| (v, 0.5)));
    for (val, len) in y_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        let tl = y_tl * len;
        canvas.line(area.left, py, area.left + dir * tl, py, &tick_style);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * tl, py, &tick_style);
        }
    }
    let label_x = area.left - text.y_label * 0.4 - if inward { 0.0 } else { y_tl };
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            canvas.text(label_x, py, label, &y_label_style);
        }
    }

    // Frame on top of the ticks
    let (l, r, t, b) = (area.left, area.right(), area.top, area.bottom());
    canvas.polyline(&[(l, t), (r, t), (r, b), (l, b), (l, t)], &frame_style);

    // --- Axis titles ---
    if !x_axis.label.is_empty() {
        let style = TextStyle {
            size: text.x_title * scale,
            color: frame_color,
            anchor: TextAnchor::End,
            baseline: TextBaseline::Hanging,
            ..Default::default()
        };
        let y = label_y + text.x_label * 1.3;
        canvas.text(area.right(), y, &x_axis.label, &style);
    }
    if !y_axis.label.is_empty() {
        let style = TextStyle {
            size: text.y_title * scale,
            color: frame_color,
            anchor: TextAnchor::End,
            ..Default::default()
        };
        let x = area.left - text.y_title_offset;
        canvas.text_rotated(x, area.top, &y_axis.label, &style, -90.0);
    }
}
