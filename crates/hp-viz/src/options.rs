use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ratio::RatioType;

/// Every display option recognized by the comparison-plot builder.
///
/// Unset optional fields fall back to data-driven defaults computed in
/// [`ComparisonArtifact::build`](crate::ComparisonArtifact::build). Unknown
/// keys are rejected so a typo never silently falls back to a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    /// Output directory, created when missing. `None` writes next to the
    /// plot name.
    pub plotdir: Option<PathBuf>,

    // --- axes ---
    /// X-axis title (empty by default).
    pub xtitle: Option<String>,
    /// Y-axis title (default `Events / <bin width> GeV`).
    pub ytitle: Option<String>,
    /// Lower x bound (default: first bin edge of the data).
    pub xmin: Option<f64>,
    /// Upper x bound (default: last bin edge of the data).
    pub xmax: Option<f64>,
    /// Lower y bound (default 0, or 0.02 in log scale; a non-positive value
    /// is ignored in log scale).
    pub ymin: Option<f64>,
    /// Upper y bound (default 1.6 × largest content+error, ×20 in log scale).
    pub ymax: Option<f64>,
    /// Lower y bound of the bottom panel.
    pub r_ymin: Option<f64>,
    /// Upper y bound of the bottom panel.
    pub r_ymax: Option<f64>,
    /// Logarithmic y axis on the main panel.
    pub is_logy: bool,
    /// One label per bin (e.g. one region yield per bin).
    pub bin_label: Option<Vec<String>>,
    /// X-axis label size on the bottom panel (fraction of pad height).
    pub xlabel_size: Option<f64>,
    /// X-axis label offset on the bottom panel (fraction of pad height).
    pub xlabel_offset: Option<f64>,
    /// One integer-valued tick per bin on the x axis.
    #[serde(alias = "xticksInt")]
    pub xticks_int: bool,

    // --- legend ---
    /// Legend box `[x1, y1, x2, y2]` in pad fractions.
    pub leg_pos: Option<[f64; 4]>,
    /// Legend column count.
    pub leg_ncols: usize,
    /// Legend text size (pad fraction, ~0.030 to ~0.045).
    pub leg_textsize: Option<f64>,
    /// Append event yields to legend labels.
    pub leg_put_nevts: bool,
    /// Legend label of the total prediction band.
    pub unc_leg: String,

    // --- histograms ---
    /// Data marker size (default 1.7 with a bottom panel, 2.0 without, × can_scale).
    pub m_size: Option<f64>,
    /// Fill style of the uncertainty band (ROOT code: 0 hollow, 1001 solid, 3ijk hatched).
    pub error_fill: u32,
    /// Opacity of the uncertainty band in `[0, 1]`.
    pub error_alpha: f64,
    /// Outline width of stacked backgrounds.
    pub histo_border: f64,
    /// Signal line style (1 solid, 2 dashed, 3 dotted, 4 dash-dotted).
    pub sig_line_style: u32,

    // --- labels ---
    /// Caption lines printed below the experiment label.
    pub plot_labels: Vec<String>,
    /// Status after the experiment name (`Internal`, `Preliminary`, ...);
    /// `ATLAS` prints the experiment name alone.
    pub atlas_label: String,
    /// Integrated luminosity in fb⁻¹.
    pub lumi: f64,

    // --- canvas ---
    /// Width divisor: canvas width becomes `width / can_ratio`.
    pub can_ratio: Option<f64>,
    /// Overall canvas scale.
    pub can_scale: f64,
    /// Draw the bottom panel.
    pub plot_ratio: bool,
    /// What the bottom panel shows.
    pub ratio_type: RatioType,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            plotdir: Some(PathBuf::from("plots")),
            xtitle: None,
            ytitle: None,
            xmin: None,
            xmax: None,
            ymin: None,
            ymax: None,
            r_ymin: None,
            r_ymax: None,
            is_logy: false,
            bin_label: None,
            xlabel_size: None,
            xlabel_offset: None,
            xticks_int: false,
            leg_pos: None,
            leg_ncols: 1,
            leg_textsize: None,
            leg_put_nevts: false,
            unc_leg: "Total bkg w/ unc.".into(),
            m_size: None,
            error_fill: 3356,
            error_alpha: 0.3,
            histo_border: 0.0,
            sig_line_style: 1,
            plot_labels: Vec::new(),
            atlas_label: "Internal".into(),
            lumi: 1.0,
            can_ratio: None,
            can_scale: 1.0,
            plot_ratio: true,
            ratio_type: RatioType::Ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = PlotOptions::default();
        assert_eq!(o.plotdir.as_deref(), Some(std::path::Path::new("plots")));
        assert_eq!(o.atlas_label, "Internal");
        assert_eq!(o.ratio_type, RatioType::Ratio);
        assert!(o.plot_ratio);
        assert_eq!(o.error_fill, 3356);
    }

    #[test]
    fn yaml_overrides() {
        let yaml = "ratio_type: signif\nymax: 300\nleg_put_nevts: true\nxticksInt: true\n";
        let o: PlotOptions = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(o.ratio_type, RatioType::Signif);
        assert_eq!(o.ymax, Some(300.0));
        assert!(o.leg_put_nevts);
        assert!(o.xticks_int);
        assert_eq!(o.leg_ncols, 1);
    }

    #[test]
    fn bogus_ratio_type_rejected_at_parse() {
        let err = serde_yaml_ng::from_str::<PlotOptions>("ratio_type: bogus\n").unwrap_err();
        assert!(err.to_string().contains("bogus"), "{err}");
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(serde_json::from_str::<PlotOptions>(r#"{"ratio_typ": "ratio"}"#).is_err());
    }
}
