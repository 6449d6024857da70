use hp_viz::PlotOptions;
use serde::Deserialize;

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level rendering configuration (YAML or programmatic).
///
/// `comparison` carries the plot options, so one YAML file can hold both
/// the look and the content decisions of a plot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub experiment: ExperimentConfig,
    pub colors: ColorsConfig,
    pub output: OutputConfig,
    pub comparison: PlotOptions,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Atlas.base_config()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// CSS font-family list written into the SVG.
    pub family: String,
    /// Multiplier applied to every text size.
    pub scale: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { family: "Helvetica, Arial, sans-serif".into(), scale: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    /// Major tick length as a fraction of the frame height (x ticks) or
    /// width (y ticks).
    pub tick_length: f64,
    pub minor_ticks: bool,
    pub frame_width: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 0.03,
            minor_ticks: true,
            frame_width: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Experiment name drawn in the label block; empty hides it.
    pub name: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { name: "ATLAS".into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub data: Color,
    pub band: Color,
    pub reference_line: Color,
    pub frame: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            data: Color::BLACK,
            band: Color::BLACK,
            reference_line: Color::rgb(255, 0, 0),
            frame: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Files written by [`crate::Renderer::save`]: any of `pdf`, `png`,
    /// `svg`, `json`.
    pub formats: Vec<String>,
    /// PNG resolution; 72 keeps one pixel per canvas unit.
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { formats: vec!["pdf".into(), "png".into(), "svg".into(), "json".into()], dpi: 72 }
    }
}

const SECTIONS: &[&str] = &["theme", "font", "axes", "experiment", "colors", "output", "comparison"];

fn section<T: serde::de::DeserializeOwned>(
    map: &serde_yaml_ng::Mapping,
    key: &str,
) -> crate::Result<Option<T>> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => serde_yaml_ng::from_value(v.clone())
            .map(Some)
            .map_err(|e| crate::RenderError::Config(format!("{key}: {e}"))),
    }
}

/// Resolve a VizConfig from an optional YAML string.
///
/// The `theme` key picks the base configuration; every other top-level
/// section present in the YAML replaces the theme's section (missing fields
/// inside it take their defaults).
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(VizConfig::default());
    };
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    let map = match value {
        serde_yaml_ng::Value::Mapping(m) => m,
        serde_yaml_ng::Value::Null => return Ok(VizConfig::default()),
        _ => return Err(crate::RenderError::Config("expected a mapping at top level".into())),
    };
    for key in map.keys() {
        let name = key.as_str().unwrap_or_default();
        if !SECTIONS.contains(&name) {
            return Err(crate::RenderError::Config(format!("unknown section '{name}'")));
        }
    }

    let theme: Option<String> = section(&map, "theme")?;
    let mut config = match theme {
        Some(name) => BuiltinTheme::parse(&name)?.base_config(),
        None => VizConfig::default(),
    };
    if let Some(v) = section(&map, "font")? {
        config.font = v;
    }
    if let Some(v) = section(&map, "axes")? {
        config.axes = v;
    }
    if let Some(v) = section(&map, "experiment")? {
        config.experiment = v;
    }
    if let Some(v) = section(&map, "colors")? {
        config.colors = v;
    }
    if let Some(v) = section(&map, "output")? {
        config.output = v;
    }
    if let Some(v) = section(&map, "comparison")? {
        config.comparison = v;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_viz::RatioType;

    #[test]
    fn no_yaml_is_atlas() {
        let c = resolve_config(None).unwrap();
        assert_eq!(c.theme, "atlas");
        assert_eq!(c.experiment.name, "ATLAS");
        assert_eq!(c.output.formats.len(), 4);
    }

    #[test]
    fn theme_then_sections() {
        let yaml = r##"
theme: cms
colors:
  band: "#336699"
comparison:
  ratio_type: signif
  ymax: 300
"##;
        let c = resolve_config(Some(yaml)).unwrap();
        assert_eq!(c.theme, "cms");
        assert_eq!(c.experiment.name, "CMS");
        assert_eq!(c.colors.band, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(c.colors.data, Color::BLACK);
        assert_eq!(c.comparison.ratio_type, RatioType::Signif);
        assert_eq!(c.comparison.ymax, Some(300.0));
    }

    #[test]
    fn bad_input_is_a_config_error() {
        assert!(resolve_config(Some("theme: nope\n")).is_err());
        assert!(resolve_config(Some("colour: {}\n")).is_err());
        assert!(resolve_config(Some("comparison:\n  ratio_type: bogus\n")).is_err());
        assert!(resolve_config(Some("colors:\n  band: blue\n")).is_err());
        assert!(resolve_config(Some("- 1\n")).is_err());
    }
}
