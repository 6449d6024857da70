use std::fmt::Write as FmtWrite;

use crate::color::Color;
use crate::primitives::*;
use crate::text::{SCRIPT_SCALE, Shift, TextMetrics, measure_styled, parse_latex};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: Style,
    },
    PatternRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        pattern_id: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
        rotate: Option<f64>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Group {
        clip_id: String,
        children: Vec<SvgElement>,
    },
}

/// Immediate-mode SVG canvas. Coordinates in pixels, y pointing down.
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    font_family: String,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    patterns: Vec<(String, String)>,
    clip_stack: Vec<String>,
    next_clip_id: usize,
}

impl Canvas {
    pub fn new(width: f64, height: f64, font_family: impl Into<String>) -> Self {
        Self {
            width,
            height,
            font_family: font_family.into(),
            elements: Vec::new(),
            defs: Vec::new(),
            patterns: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
        }
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        let (x, y, w, h) = normalize_rect(x, y, w, h);
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    /// Text in ROOT TLatex markup.
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Error bar: vertical line + optional horizontal caps.
    pub fn error_bar(&mut self, x: f64, y_lo: f64, y_hi: f64, cap_width: f64, style: &LineStyle) {
        self.line(x, y_lo, x, y_hi, style);
        if cap_width > 0.0 {
            let half = cap_width / 2.0;
            self.line(x - half, y_lo, x + half, y_lo, style);
            self.line(x - half, y_hi, x + half, y_hi, style);
        }
    }

    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let style = Style {
            fill: Some(marker.color),
            stroke: Some(marker.color),
            stroke_width: 0.5,
            opacity: 1.0,
        };
        self.circle(x, y, marker.size, &style);
    }

    /// Rectangle filled with a ROOT fill pattern in `color`.
    pub fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        pattern: &FillPattern,
        color: Color,
    ) {
        match pattern {
            FillPattern::Hollow => {}
            FillPattern::Solid => self.rect(x, y, w, h, &Style::filled(color)),
            FillPattern::Hatch { spacing, angles } => {
                let (x, y, w, h) = normalize_rect(x, y, w, h);
                for &angle in angles {
                    let pattern_id = self.hatch_pattern(*spacing, angle, color);
                    self.push(SvgElement::PatternRect { x, y, w, h, pattern_id });
                }
            }
        }
    }

    /// Id of a hatch pattern, defined on first use.
    fn hatch_pattern(&mut self, spacing: f64, angle: f64, color: Color) -> String {
        let key = format!("{spacing:.2}/{angle:.1}/{}", color.to_svg_fill());
        if let Some((_, id)) = self.patterns.iter().find(|(k, _)| *k == key) {
            return id.clone();
        }
        let id = format!("hatch{}", self.patterns.len());
        // SVG rotates clockwise; hatch angles are counter-clockwise from the x axis.
        self.defs.push(format!(
            r#"<pattern id="{id}" patternUnits="userSpaceOnUse" width="{sp:.2}" height="{sp:.2}" patternTransform="rotate({rot:.1})"><line x1="0" y1="0" x2="{sp:.2}" y2="0" stroke="{c}" stroke-width="1.2"/></pattern>"#,
            sp = spacing,
            rot = -angle,
            c = color.to_svg_fill(),
        ));
        self.patterns.push((key, id.clone()));
        id
    }

    // --- Clip paths ---

    /// Clip everything drawn until [`Canvas::pop_clip`]. Clips do not nest.
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.clear();
        self.clip_stack.push(id.clone());
        self.elements.push(SvgElement::Group { clip_id: id.clone(), children: Vec::new() });
        id
    }

    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    // --- Text measurement ---

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        measure_styled(content, style)
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        if let Some(id) = self.clip_stack.last()
            && let Some(SvgElement::Group { clip_id, children }) = self.elements.last_mut()
            && *clip_id == *id
        {
            children.push(elem);
            return;
        }
        self.elements.push(elem);
    }

    pub fn finish_svg(&self) -> String {
        let mut out = String::with_capacity(32 * 1024);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        let _ = writeln!(
            out,
            r#"<rect width="{}" height="{}" fill="white" />"#,
            self.width, self.height
        );

        for elem in &self.elements {
            render_element(&mut out, elem, &self.font_family);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn normalize_rect(x: f64, y: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
    let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
    let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
    (x, y, w, h)
}

fn escape_into(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn render_element(out: &mut String, elem: &SvgElement, font_family: &str) {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            let _ = write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::PatternRect { x, y, w, h, pattern_id } => {
            let _ = writeln!(
                out,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="url(#{pattern_id})" />"#
            );
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            let _ = write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polyline { points, style } => {
            out.push_str(r#"<polyline points=""#);
            for (i, (x, y)) in points.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{x:.2},{y:.2}");
            }
            out.push_str(r#"" fill="none""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            let _ = write!(out, r#"<text x="{x:.2}" y="{y:.2}""#);
            out.push_str(r#" font-family=""#);
            escape_into(out, font_family);
            let _ = write!(out, r#"" font-size="{:.1}""#, style.size);
            let _ = write!(out, r#" fill="{}""#, style.color.to_svg_fill());
            let _ = write!(out, r#" text-anchor="{}""#, style.anchor.as_str());
            let _ = write!(out, r#" dominant-baseline="{}""#, style.baseline.as_str());
            if style.weight == FontWeight::Bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if style.style == FontStyle::Italic {
                out.push_str(r#" font-style="italic""#);
            }
            if let Some(angle) = rotate {
                let _ = write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#);
            }
            out.push('>');
            for run in parse_latex(content) {
                match run.shift {
                    Shift::Normal => escape_into(out, &run.text),
                    Shift::Super | Shift::Sub => {
                        let shift = if run.shift == Shift::Super { "super" } else { "sub" };
                        let _ = write!(
                            out,
                            r#"<tspan baseline-shift="{shift}" font-size="{:.1}">"#,
                            style.size * SCRIPT_SCALE
                        );
                        escape_into(out, &run.text);
                        out.push_str("</tspan>");
                    }
                }
            }
            out.push_str("</text>\n");
        }
        SvgElement::Circle { cx, cy, r, style } => {
            let _ = write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Group { clip_id, children } => {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(out, child, font_family);
            }
            out.push_str("</g>\n");
        }
    }
}

fn write_style_attrs(out: &mut String, style: &Style) {
    if let Some(fill) = &style.fill {
        let _ = write!(out, r#" fill="{}""#, fill.to_svg_fill());
    } else {
        out.push_str(r#" fill="none""#);
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(out, r#" stroke="{}""#, stroke.to_svg_fill());
        let _ = write!(out, r#" stroke-width="{:.2}""#, style.stroke_width);
    }
    if (style.opacity - 1.0).abs() > 1e-4 {
        let _ = write!(out, r#" opacity="{:.3}""#, style.opacity);
    }
}

fn write_line_attrs(out: &mut String, style: &LineStyle) {
    let _ = write!(out, r#" stroke="{}""#, style.color.to_svg_fill());
    let _ = write!(out, r#" stroke-width="{:.2}""#, style.width);
    if let Some(dash) = &style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = "Helvetica, Arial, sans-serif";

    #[test]
    fn empty_canvas() {
        let c = Canvas::new(100.0, 50.0, FONT);
        let svg = c.finish_svg();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn rect_rendering() {
        let mut c = Canvas::new(200.0, 100.0, FONT);
        c.rect(10.0, 50.0, 50.0, -30.0, &Style::filled(Color::hex("#ff0000")));
        let svg = c.finish_svg();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r#"y="20.00" width="50.00" height="30.00""#));
    }

    #[test]
    fn text_with_scripts() {
        let mut c = Canvas::new(200.0, 100.0, FONT);
        c.text(10.0, 20.0, "fb^{-1} & more", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains(r#"<tspan baseline-shift="super""#));
        assert!(svg.contains("&amp; more"));
        assert!(svg.contains("font-family=\"Helvetica, Arial, sans-serif\""));
    }

    #[test]
    fn hatch_patterns_are_shared() {
        let mut c = Canvas::new(200.0, 100.0, FONT);
        let p = FillPattern::from_root(3356);
        c.fill_rect(0.0, 0.0, 10.0, 10.0, &p, Color::BLACK);
        c.fill_rect(10.0, 0.0, 10.0, 10.0, &p, Color::BLACK);
        let svg = c.finish_svg();
        assert_eq!(svg.matches("<pattern ").count(), 1);
        assert_eq!(svg.matches("url(#hatch0)").count(), 2);
    }

    #[test]
    fn clipped_elements_are_grouped() {
        let mut c = Canvas::new(200.0, 100.0, FONT);
        c.push_clip(0.0, 0.0, 50.0, 50.0);
        c.line(0.0, 0.0, 100.0, 100.0, &LineStyle::default());
        c.pop_clip();
        c.line(0.0, 0.0, 1.0, 1.0, &LineStyle::default());
        let svg = c.finish_svg();
        let g = svg.find("<g clip-path=\"url(#clip0)\">").unwrap();
        let end = svg.find("</g>").unwrap();
        let first_line = svg.find("<line").unwrap();
        assert!(g < first_line && first_line < end);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.rfind("<line").unwrap() > end);
    }
}
