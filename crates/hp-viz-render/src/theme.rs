use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    Atlas,
    Cms,
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "atlas" => Ok(Self::Atlas),
            "cms" => Ok(Self::Cms),
            "minimal" => Ok(Self::Minimal),
            other => Err(crate::RenderError::Config(format!(
                "unknown theme '{other}' (expected atlas, cms or minimal)"
            ))),
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Atlas => atlas(),
            Self::Cms => cms(),
            Self::Minimal => minimal(),
        }
    }
}

fn atlas() -> VizConfig {
    VizConfig {
        theme: "atlas".into(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        experiment: ExperimentConfig { name: "ATLAS".into() },
        colors: ColorsConfig::default(),
        output: OutputConfig::default(),
        comparison: Default::default(),
    }
}

fn cms() -> VizConfig {
    VizConfig {
        theme: "cms".into(),
        font: FontConfig { family: "Helvetica, Arial, sans-serif".into(), scale: 1.05 },
        axes: AxesConfig { tick_length: 0.025, ..AxesConfig::default() },
        experiment: ExperimentConfig { name: "CMS".into() },
        ..atlas()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        font: FontConfig { family: "sans-serif".into(), scale: 1.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 0.02,
            minor_ticks: false,
            frame_width: 1.0,
        },
        experiment: ExperimentConfig { name: String::new() },
        ..atlas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(BuiltinTheme::parse("ATLAS").unwrap(), BuiltinTheme::Atlas);
        assert_eq!(BuiltinTheme::parse("Cms").unwrap(), BuiltinTheme::Cms);
        assert!(BuiltinTheme::parse("solarized").is_err());
    }

    #[test]
    fn minimal_hides_experiment() {
        let c = BuiltinTheme::Minimal.base_config();
        assert!(c.experiment.name.is_empty());
        assert!(!c.axes.show_top_ticks);
        assert_eq!(c.comparison.atlas_label, "Internal");
    }
}
