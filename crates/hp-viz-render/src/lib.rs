pub mod canvas;
pub mod color;
pub mod config;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::{Path, PathBuf};

use config::VizConfig;
use hp_viz::{ComparisonArtifact, ComparisonInputs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Core(#[from] hp_core::Error),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render a comparison artifact JSON to SVG string.
pub fn render_svg(artifact_json: &str, config: &VizConfig) -> Result<String> {
    let art: ComparisonArtifact = serde_json::from_str(artifact_json)?;
    plots::comparison::render(&art, config)
}

/// Render an artifact to bytes in the specified format (`svg`, `png`,
/// `pdf` or `json`).
pub fn render_to_bytes(
    artifact: &ComparisonArtifact,
    format: &str,
    config: &VizConfig,
) -> Result<Vec<u8>> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(artifact)?.into_bytes());
    }
    let svg = plots::comparison::render(artifact, config)?;
    match format {
        "svg" => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        "png" => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        "pdf" => output::pdf::svg_to_pdf(&svg),
        other => Err(RenderError::UnknownFormat(other.to_string())),
    }
}

/// Render an artifact to a file (format inferred from extension).
pub fn render_to_file(artifact: &ComparisonArtifact, path: &Path, config: &VizConfig) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("svg");
    let bytes = render_to_bytes(artifact, ext, config)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write every format listed in `config.output.formats` under the
/// artifact's plot directory, creating it if needed.
///
/// Formats compiled out of this build are skipped with a warning. Returns
/// the paths written, in format order.
pub fn save_plot(
    artifact: &ComparisonArtifact,
    plot_name: &str,
    config: &VizConfig,
) -> Result<Vec<PathBuf>> {
    if let Some(dir) = &artifact.output.plotdir {
        std::fs::create_dir_all(dir)?;
    }
    let paths = artifact.output_paths(plot_name);

    // one SVG serves every vector/raster format
    let needs_svg = config.output.formats.iter().any(|f| f != "json");
    let svg = if needs_svg { plots::comparison::render(artifact, config)? } else { String::new() };

    let mut written = Vec::new();
    for format in &config.output.formats {
        let path = match format.as_str() {
            "json" => &paths.json,
            "svg" => &paths.svg,
            "png" => &paths.png,
            "pdf" => &paths.pdf,
            other => return Err(RenderError::UnknownFormat(other.to_string())),
        };
        let bytes = match format.as_str() {
            "json" => serde_json::to_string_pretty(artifact)?.into_bytes(),
            "svg" => svg.clone().into_bytes(),
            #[cfg(feature = "png")]
            "png" => output::png::svg_to_png(&svg, config.output.dpi)?,
            #[cfg(feature = "pdf")]
            "pdf" => output::pdf::svg_to_pdf(&svg)?,
            _ => {
                tracing::warn!(format = %format, "output format not compiled in; skipping");
                continue;
            }
        };
        std::fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), "wrote plot");
        written.push(path.clone());
    }
    Ok(written)
}

/// A plotting session: one resolved style applied to every plot it draws.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: VizConfig,
}

impl Renderer {
    pub fn new(config: VizConfig) -> Self {
        Self { config }
    }

    /// Session from an optional YAML configuration.
    pub fn from_yaml(yaml: Option<&str>) -> Result<Self> {
        Ok(Self::new(config::resolve_config(yaml)?))
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Decide the plot for `inputs` with this session's plot options.
    pub fn build(&self, inputs: &ComparisonInputs) -> Result<ComparisonArtifact> {
        Ok(ComparisonArtifact::build(inputs, &self.config.comparison)?)
    }

    pub fn render_svg(&self, artifact: &ComparisonArtifact) -> Result<String> {
        plots::comparison::render(artifact, &self.config)
    }

    pub fn render_to_bytes(&self, artifact: &ComparisonArtifact, format: &str) -> Result<Vec<u8>> {
        render_to_bytes(artifact, format, &self.config)
    }

    pub fn save(&self, artifact: &ComparisonArtifact, plot_name: &str) -> Result<Vec<PathBuf>> {
        save_plot(artifact, plot_name, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_hist::Histogram;
    use hp_viz::{BackgroundEntry, ComparisonInputs, PlotOptions};

    fn artifact(plotdir: Option<PathBuf>) -> ComparisonArtifact {
        let bkg = Histogram::from_parts(
            "bkg",
            vec![0.0, 1.0, 2.0],
            vec![0.0, 4.0, 9.0, 0.0],
            vec![0.0, 2.0, 3.0, 0.0],
        )
        .unwrap();
        let data = Histogram::from_parts(
            "data",
            vec![0.0, 1.0, 2.0],
            vec![0.0, 5.0, 8.0, 0.0],
            vec![0.0, 5f64.sqrt(), 8f64.sqrt(), 0.0],
        )
        .unwrap();
        let inputs = ComparisonInputs {
            backgrounds: vec![BackgroundEntry {
                name: "bkg".into(),
                histogram: bkg.clone(),
                color: "#6699cc".into(),
                legend: "Background".into(),
            }],
            total: bkg,
            data,
            signals: Vec::new(),
        };
        let opts = PlotOptions { plotdir, ..Default::default() };
        ComparisonArtifact::build(&inputs, &opts).unwrap()
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hp-viz-render-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn render_svg_from_json() {
        let json = serde_json::to_string(&artifact(None)).unwrap();
        let svg = render_svg(&json, &VizConfig::default()).unwrap();
        assert!(svg.contains("</svg>"));
        assert!(render_svg("{}", &VizConfig::default()).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = render_to_bytes(&artifact(None), "gif", &VizConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownFormat(_)));
    }

    #[test]
    fn save_writes_svg_and_json_into_new_dir() {
        let dir = scratch_dir("save").join("nested");
        let art = artifact(Some(dir.clone()));
        let mut config = VizConfig::default();
        config.output.formats = vec!["svg".into(), "json".into()];

        let written = save_plot(&art, "Example_plot", &config).unwrap();
        assert_eq!(
            written,
            vec![dir.join("Example_plot_Internal.svg"), dir.join("Example_plot_Internal.json")]
        );
        let json = std::fs::read_to_string(&written[1]).unwrap();
        let back: ComparisonArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bin_edges, art.bin_edges);
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn render_to_file_picks_format_from_extension() {
        let dir = scratch_dir("file");
        std::fs::create_dir_all(&dir).unwrap();
        let art = artifact(None);
        let config = VizConfig::default();

        render_to_file(&art, &dir.join("plot.svg"), &config).unwrap();
        assert!(std::fs::read_to_string(dir.join("plot.svg")).unwrap().contains("</svg>"));
        render_to_file(&art, &dir.join("plot.json"), &config).unwrap();
        assert!(std::fs::read_to_string(dir.join("plot.json")).unwrap().contains("bin_edges"));
        assert!(render_to_file(&art, &dir.join("plot.gif"), &config).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn renderer_surfaces_plot_errors() {
        let mut art = artifact(None);
        let renderer = Renderer::default();
        assert!(renderer.render_svg(&art).is_ok());

        art.stack[0].color = "not-a-color".into();
        assert!(matches!(renderer.render_svg(&art), Err(RenderError::Config(_))));

        let yaml = "comparison:\n  ratio_type: signif\n";
        let renderer = Renderer::from_yaml(Some(yaml)).unwrap();
        let inputs = ComparisonInputs {
            backgrounds: Vec::new(),
            total: art.total.clone(),
            data: art.data.clone(),
            signals: Vec::new(),
        };
        let err = renderer.build(&inputs).unwrap_err();
        assert!(matches!(err, RenderError::Core(hp_core::Error::Config(_))));
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_has_canvas_size_at_72_dpi() {
        let bytes = render_to_bytes(&artifact(None), "png", &VizConfig::default()).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        // IHDR width and height, big endian
        let w = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let h = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert_eq!((w, h), (900, 800));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_starts_with_header() {
        let bytes = render_to_bytes(&artifact(None), "pdf", &VizConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
