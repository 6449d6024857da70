//! Stacked background / data / signal comparison artifact (numbers-first).
//!
//! [`ComparisonArtifact::build`] takes the caller's histograms and a
//! [`PlotOptions`] set and resolves every decision the renderer needs: stack
//! order, axis ranges and titles, canvas and pad geometry, legend entries,
//! label block and the bottom panel. Inputs are cloned, never mutated.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use hp_core::{Error, Result};
use hp_hist::{Histogram, normalize_to};
use serde::{Deserialize, Serialize};

use crate::layout::{CanvasSpec, LabelBlock, LegendBox, marker_size};
use crate::options::PlotOptions;
use crate::ratio::{RatioPanel, missing_signal};

/// Schema identifier written into every artifact.
pub const SCHEMA_VERSION: &str = "hepplotting_comparison_v1";

/// Experiment name printed in the label block.
pub const EXPERIMENT: &str = "ATLAS";

/// Default-range headroom above the tallest bin.
const Y_HEADROOM: f64 = 1.6;
/// Extra headroom factor in log scale.
const LOGY_HEADROOM: f64 = 20.0;
/// Default lower bound in log scale.
const LOGY_MIN: f64 = 0.02;

/// One stacked background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundEntry {
    /// Sample name.
    pub name: String,
    /// Expected yield per bin.
    pub histogram: Histogram,
    /// Fill colour, hex (`#RRGGBB`).
    pub color: String,
    /// Legend label.
    pub legend: String,
}

/// One signal overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
    /// Sample name.
    pub name: String,
    /// Signal shape; rescaled to `norm` when set.
    pub histogram: Histogram,
    /// Line colour, hex (`#RRGGBB`).
    pub color: String,
    /// Target integral; `None` (or 0) keeps the input normalisation.
    #[serde(default)]
    pub norm: Option<f64>,
    /// Legend label.
    pub legend: String,
}

/// Everything a comparison plot is made of.
///
/// `backgrounds` are listed top of the stack first, the way they appear in
/// the legend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInputs {
    /// Stacked backgrounds.
    pub backgrounds: Vec<BackgroundEntry>,
    /// Total prediction, usually the background sum with systematics.
    pub total: Histogram,
    /// Observed counts.
    pub data: Histogram,
    /// Overlaid signals; the first one feeds the S/√B and Z_A panels.
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
}

/// Provenance stamped into every artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMeta {
    /// Always `hepplotting`.
    pub tool: String,
    /// Crate version that built the artifact.
    pub tool_version: String,
    /// Build time, milliseconds since the Unix epoch.
    pub created_unix_ms: u64,
}

/// A stacked layer, listed bottom to top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackLayer {
    /// Sample name.
    pub name: String,
    /// Fill colour, hex.
    pub color: String,
    /// Yield of this layer alone, not the cumulative sum.
    pub histogram: Histogram,
}

/// A signal after normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalLayer {
    /// Sample name.
    pub name: String,
    /// Line colour, hex.
    pub color: String,
    /// Normalised copy of the input histogram.
    pub histogram: Histogram,
}

/// Resolved main-panel axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxesSpec {
    /// Visible x range.
    pub x_min: f64,
    /// Visible x range.
    pub x_max: f64,
    /// Visible y range.
    pub y_min: f64,
    /// Visible y range.
    pub y_max: f64,
    /// X axis title (ROOT latex markup allowed).
    pub x_title: String,
    /// Y axis title, `Events / N GeV` unless overridden.
    pub y_title: String,
    /// Logarithmic y axis.
    pub logy: bool,
    /// One label per bin, replacing numeric x ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_labels: Option<Vec<String>>,
    /// One tick per bin edge.
    pub xticks_int: bool,
    /// X tick label size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlabel_size: Option<f64>,
    /// X title offset override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlabel_offset: Option<f64>,
}

/// Legend symbol, as in ROOT `TLegend::AddEntry` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendSymbol {
    /// Marker with error line (data).
    Lp,
    /// Filled box (backgrounds, uncertainty band).
    F,
    /// Line (signals).
    L,
}

/// What a legend entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendTarget {
    /// Observed data.
    Data,
    /// A stacked background.
    Background,
    /// A signal overlay.
    Signal,
    /// The total-prediction uncertainty band.
    Total,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Text, with the event count appended when requested.
    pub label: String,
    /// Swatch kind.
    pub symbol: LegendSymbol,
    /// Drawn object the row describes.
    pub target: LegendTarget,
    /// Swatch colour; `None` for data and the uncertainty band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Legend placement and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    /// Box in pad coordinates.
    #[serde(rename = "box")]
    pub frame: LegendBox,
    /// Rows in display order.
    pub entries: Vec<LegendEntry>,
}

/// Histogram cosmetics resolved from the options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Data marker size, ROOT units.
    pub marker_size: f64,
    /// ROOT fill style of the uncertainty band (1001 solid, 3xxx hatched).
    pub error_fill: u32,
    /// Band opacity.
    pub error_alpha: f64,
    /// Stack outline width; 0 draws no outline.
    pub histo_border: f64,
    /// ROOT line style of the signals.
    pub sig_line_style: u32,
    /// Line colour of the S/√B or Z_A histogram (first signal colour).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_color: Option<String>,
}

/// Where the plot files go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Output directory; `None` writes next to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plotdir: Option<PathBuf>,
    /// File name suffix and status text.
    pub atlas_label: String,
}

/// Fully resolved comparison plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonArtifact {
    /// `hepplotting_comparison_v1`.
    pub schema_version: String,
    /// Provenance.
    pub meta: ComparisonMeta,
    /// Shared bin edges of every histogram.
    pub bin_edges: Vec<f64>,
    /// Bottom to top.
    pub stack: Vec<StackLayer>,
    /// Observed counts.
    pub data: Histogram,
    /// Total prediction and its band.
    pub total: Histogram,
    /// Normalised signal overlays.
    pub signals: Vec<SignalLayer>,
    /// Main-panel axes.
    pub axes: AxesSpec,
    /// Canvas size and pad split.
    pub canvas: CanvasSpec,
    /// Legend box and rows.
    pub legend: LegendSpec,
    /// Experiment label, luminosity and captions.
    pub labels: LabelBlock,
    /// Histogram cosmetics.
    pub style: StyleSpec,
    /// Output location.
    pub output: OutputSpec,
    /// Lower panel; `None` when disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioPanel>,
}

fn now_unix_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn is_data_name(name: &str) -> bool {
    matches!(name, "Data" | "data" | "DATA")
}

/// Legend label, optionally annotated with the integral (flows included).
fn legend_label(h: &Histogram, name: &str, with_yields: bool) -> String {
    if !with_yields {
        return name.to_string();
    }
    let (n, e) = h.integral_and_error();
    if is_data_name(name) {
        format!("{name} ({n:.0})")
    } else {
        format!("{name} ({n:.0} \u{00B1} {e:.0})")
    }
}

impl ComparisonArtifact {
    /// Resolve a comparison plot from `inputs` and `opts`.
    ///
    /// A bottom panel that needs a signal is rejected before any other work.
    pub fn build(inputs: &ComparisonInputs, opts: &PlotOptions) -> Result<Self> {
        if opts.plot_ratio && opts.ratio_type.requires_signal() && inputs.signals.is_empty() {
            return Err(missing_signal(opts.ratio_type));
        }
        if !(opts.can_scale.is_finite() && opts.can_scale > 0.0) {
            return Err(Error::Config(format!("can_scale must be positive, got {}", opts.can_scale)));
        }

        let data = inputs.data.clone();
        let total = inputs.total.clone();
        data.check_binning(&total)?;

        let mut signals = Vec::with_capacity(inputs.signals.len());
        for s in &inputs.signals {
            data.check_binning(&s.histogram)?;
            let mut h = s.histogram.clone();
            if let Some(norm) = s.norm
                && norm != 0.0
            {
                normalize_to(&mut h, norm);
            }
            signals.push((s, h));
        }
        for b in &inputs.backgrounds {
            data.check_binning(&b.histogram)?;
        }

        let axes = resolve_axes(inputs, &data, &total, signals.iter().map(|(_, h)| h), opts);

        let with_yields = opts.leg_put_nevts;
        let mut entries = Vec::with_capacity(inputs.backgrounds.len() + signals.len() + 2);
        entries.push(LegendEntry {
            label: legend_label(&data, "Data", with_yields),
            symbol: LegendSymbol::Lp,
            target: LegendTarget::Data,
            color: None,
        });
        for b in &inputs.backgrounds {
            entries.push(LegendEntry {
                label: legend_label(&b.histogram, &b.legend, with_yields),
                symbol: LegendSymbol::F,
                target: LegendTarget::Background,
                color: Some(b.color.clone()),
            });
        }
        for (s, h) in &signals {
            entries.push(LegendEntry {
                label: legend_label(h, &s.legend, with_yields),
                symbol: LegendSymbol::L,
                target: LegendTarget::Signal,
                color: Some(s.color.clone()),
            });
        }
        entries.push(LegendEntry {
            label: legend_label(&total, &opts.unc_leg, with_yields),
            symbol: LegendSymbol::F,
            target: LegendTarget::Total,
            color: None,
        });

        let ratio = if opts.plot_ratio {
            Some(RatioPanel::build(
                opts.ratio_type,
                &total,
                &data,
                signals.first().map(|(_, h)| h),
                opts.r_ymin,
                opts.r_ymax,
            )?)
        } else {
            None
        };

        let metric_color = match &ratio {
            Some(panel) if panel.kind.requires_signal() => {
                signals.first().map(|(s, _)| s.color.clone())
            }
            _ => None,
        };

        let stack = inputs
            .backgrounds
            .iter()
            .rev()
            .map(|b| StackLayer {
                name: b.name.clone(),
                color: b.color.clone(),
                histogram: b.histogram.clone(),
            })
            .collect();

        let signals = signals
            .into_iter()
            .map(|(s, h)| SignalLayer { name: s.name.clone(), color: s.color.clone(), histogram: h })
            .collect();

        tracing::debug!(
            n_backgrounds = inputs.backgrounds.len(),
            n_signals = inputs.signals.len(),
            ratio_type = %opts.ratio_type,
            plot_ratio = opts.plot_ratio,
            y_max = axes.y_max,
            "built comparison artifact"
        );

        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            meta: ComparisonMeta {
                tool: "hepplotting".to_string(),
                tool_version: hp_core::VERSION.to_string(),
                created_unix_ms: now_unix_ms(),
            },
            bin_edges: data.bin_edges().to_vec(),
            stack,
            data,
            total,
            signals,
            axes,
            canvas: CanvasSpec::decide(opts),
            legend: LegendSpec { frame: LegendBox::decide(opts), entries },
            labels: LabelBlock::decide(opts, EXPERIMENT),
            style: StyleSpec {
                marker_size: marker_size(opts),
                error_fill: opts.error_fill,
                error_alpha: opts.error_alpha,
                histo_border: opts.histo_border,
                sig_line_style: opts.sig_line_style,
                metric_color,
            },
            output: OutputSpec { plotdir: opts.plotdir.clone(), atlas_label: opts.atlas_label.clone() },
            ratio,
        })
    }

    /// Output files of this artifact for `plot_name`.
    pub fn output_paths(&self, plot_name: &str) -> OutputPaths {
        output_paths(self.output.plotdir.as_deref(), plot_name, &self.output.atlas_label)
    }
}

/// Axis ranges and titles. In log scale an explicit positive `ymin` is
/// kept instead of always pinning the floor to 0.02.
fn resolve_axes<'a>(
    inputs: &'a ComparisonInputs,
    data: &'a Histogram,
    total: &'a Histogram,
    signals: impl Iterator<Item = &'a Histogram>,
    opts: &PlotOptions,
) -> AxesSpec {
    let n = data.n_bins().max(1) as f64;
    let y_title = opts
        .ytitle
        .clone()
        .unwrap_or_else(|| format!("Events / {:.0} GeV", (data.x_max() - data.x_min()) / n));

    let tallest = inputs
        .backgrounds
        .iter()
        .map(|b| &b.histogram)
        .chain(std::iter::once(data))
        .chain(signals)
        .chain(std::iter::once(total))
        .map(Histogram::max_visible_with_error)
        .fold(0.0_f64, f64::max);

    let (y_min, y_max) = if opts.is_logy {
        let y_max = opts.ymax.unwrap_or(Y_HEADROOM * tallest * LOGY_HEADROOM);
        let y_min = opts.ymin.filter(|&v| v > 0.0).unwrap_or(LOGY_MIN);
        (y_min, y_max)
    } else {
        (opts.ymin.unwrap_or(0.0), opts.ymax.unwrap_or(Y_HEADROOM * tallest))
    };

    AxesSpec {
        x_min: opts.xmin.unwrap_or(data.x_min()),
        x_max: opts.xmax.unwrap_or(data.x_max()),
        y_min,
        y_max,
        x_title: opts.xtitle.clone().unwrap_or_default(),
        y_title,
        logy: opts.is_logy,
        bin_labels: opts.bin_label.clone(),
        xticks_int: opts.xticks_int,
        xlabel_size: opts.xlabel_size,
        xlabel_offset: opts.xlabel_offset,
    }
}

/// Files written for one plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Vector print output.
    pub pdf: PathBuf,
    /// Raster output.
    pub png: PathBuf,
    /// Vector web output.
    pub svg: PathBuf,
    /// Serialized artifact.
    pub json: PathBuf,
}

/// `{plotdir}/{plot_name}_{atlas_label}.{ext}`; without `plotdir` the bare
/// plot name is used as the stem.
pub fn output_paths(plotdir: Option<&Path>, plot_name: &str, atlas_label: &str) -> OutputPaths {
    let stem = format!("{plot_name}_{atlas_label}");
    let path = |ext: &str| {
        let file = format!("{stem}.{ext}");
        match plotdir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    };
    OutputPaths { pdf: path("pdf"), png: path("png"), svg: path("svg"), json: path("json") }
}
