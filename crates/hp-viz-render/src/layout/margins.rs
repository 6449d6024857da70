use hp_viz::layout::PadSpec;

/// Rectangular area within the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// A pad: its slice of the canvas and the axis frame inside its margins.
#[derive(Debug, Clone, Copy)]
pub struct Pad {
    pub area: PlotArea,
    pub frame: PlotArea,
}

impl Pad {
    pub fn from_spec(canvas_w: f64, canvas_h: f64, spec: &PadSpec) -> Self {
        let top = (1.0 - spec.y_high) * canvas_h;
        let height = (spec.y_high - spec.y_low) * canvas_h;
        let area = PlotArea::manual(0.0, top, canvas_w, height);
        let m = &spec.margins;
        let frame = PlotArea::manual(
            canvas_w * m.left,
            top + height * m.top,
            canvas_w * (1.0 - m.left - m.right),
            height * (1.0 - m.top - m.bottom),
        );
        Self { area, frame }
    }

    /// Pad-relative x (0 = left edge, 1 = right edge) to pixels.
    pub fn ndc_x(&self, x: f64) -> f64 {
        self.area.left + x * self.area.width
    }

    /// Pad-relative y (0 = bottom, 1 = top) to pixels.
    pub fn ndc_y(&self, y: f64) -> f64 {
        self.area.bottom() - y * self.area.height
    }

    /// Text size given as a fraction of the pad to pixels.
    pub fn text_px(&self, size: f64) -> f64 {
        size * self.area.width.min(self.area.height)
    }
}
