use crate::color::Color;

/// Fill + stroke style for rectangles and polygons.
#[derive(Debug, Clone)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: None, stroke: None, stroke_width: 1.0, opacity: 1.0 }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self { fill: Some(color), ..Default::default() }
    }
}

/// Line style.
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Color::BLACK, width: 1.0, dash: None }
    }
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self { color, width, dash: Some("12 12".into()) }
    }

    pub fn dotted(color: Color, width: f64) -> Self {
        Self { color, width, dash: Some("4 8".into()) }
    }

    /// ROOT line style code: 1 solid, 2 dashed, 3 dotted, 4 dash-dotted.
    /// Unknown codes draw solid.
    pub fn from_root(code: u32, color: Color, width: f64) -> Self {
        match code {
            2 => Self::dashed(color, width),
            3 => Self::dotted(color, width),
            4 => Self { color, width, dash: Some("12 16 4 16".into()) },
            _ => Self::solid(color, width),
        }
    }
}

/// Text style.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color::BLACK,
            weight: FontWeight::Regular,
            style: FontStyle::Normal,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Central,
    Hanging,
}

impl TextBaseline {
    pub fn as_str(&self) -> &str {
        match self {
            TextBaseline::Alphabetic => "auto",
            TextBaseline::Central => "central",
            TextBaseline::Hanging => "hanging",
        }
    }
}

/// Filled-circle data marker; `size` is the radius in pixels.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub size: f64,
    pub color: Color,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self { size: 3.0, color: Color::BLACK }
    }
}

/// Decoded ROOT fill style.
#[derive(Debug, Clone, PartialEq)]
pub enum FillPattern {
    /// `0`: nothing drawn.
    Hollow,
    /// `1001`.
    Solid,
    /// Hatches at the given angles (degrees), `spacing` pixels apart.
    Hatch { spacing: f64, angles: Vec<f64> },
}

impl FillPattern {
    /// Decode a ROOT fill code.
    ///
    /// `3ijk`: `i` is the spacing, `j` the angle of the first hatch set
    /// (`j × 10°`, 5 = none) and `k` the angle of the second set
    /// (`180° − k × 10°`, 5 = none). The predefined patterns 3001..=3025
    /// map to single or crossed diagonals.
    pub fn from_root(code: u32) -> Self {
        match code {
            0 | 4000..=4100 => FillPattern::Hollow,
            3001..=3025 => {
                let angles = match code {
                    3004 | 3018 => vec![45.0],
                    3005 | 3017 => vec![135.0],
                    3006 => vec![90.0],
                    3007 => vec![0.0],
                    _ => vec![45.0, 135.0],
                };
                FillPattern::Hatch { spacing: 6.0, angles }
            }
            3100..=3999 => {
                let i = (code / 100) % 10;
                let j = (code / 10) % 10;
                let k = code % 10;
                let mut angles = Vec::new();
                if j != 5 {
                    angles.push(j as f64 * 10.0);
                }
                if k != 5 {
                    angles.push(180.0 - k as f64 * 10.0);
                }
                if angles.is_empty() {
                    return FillPattern::Hollow;
                }
                FillPattern::Hatch { spacing: 3.0 * i.max(1) as f64, angles }
            }
            _ => FillPattern::Solid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band_fill_is_single_hatch() {
        assert_eq!(
            FillPattern::from_root(3356),
            FillPattern::Hatch { spacing: 9.0, angles: vec![120.0] }
        );
    }

    #[test]
    fn crossed_hatch_and_plain_codes() {
        assert_eq!(
            FillPattern::from_root(3144),
            FillPattern::Hatch { spacing: 3.0, angles: vec![40.0, 140.0] }
        );
        assert_eq!(FillPattern::from_root(3155), FillPattern::Hollow);
        assert_eq!(FillPattern::from_root(0), FillPattern::Hollow);
        assert_eq!(FillPattern::from_root(1001), FillPattern::Solid);
        assert!(matches!(FillPattern::from_root(3004), FillPattern::Hatch { .. }));
    }

    #[test]
    fn root_line_styles() {
        assert!(LineStyle::from_root(1, Color::BLACK, 1.0).dash.is_none());
        assert!(LineStyle::from_root(2, Color::BLACK, 1.0).dash.is_some());
        assert!(LineStyle::from_root(99, Color::BLACK, 1.0).dash.is_none());
    }
}
