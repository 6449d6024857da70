//! Bottom-panel computation: data/prediction ratio, S/√B and the
//! asymptotic discovery significance Z_A.
//!
//! Degenerate bins (zero background, zero uncertainty, negative radicands)
//! never raise: they collapse to a content of 0.0.

use std::fmt;
use std::str::FromStr;

use hp_core::{Error, Result};
use hp_hist::{Histogram, remove_zero_entries};
use serde::{Deserialize, Serialize};

/// Data bins whose ratio falls below this value are hidden.
const RATIO_HIDE_THRESHOLD: f64 = 0.01;
/// Prediction below this is treated as empty in the ratio panel.
const EMPTY_PREDICTION: f64 = 0.001;

/// What the bottom panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatioType {
    /// Data / prediction with the relative prediction uncertainty around 1.
    #[default]
    Ratio,
    /// `S / sqrt(B + σ_B²)` for the first signal.
    SoverB,
    /// Asimov significance with background uncertainty for the first signal.
    Signif,
}

impl RatioType {
    /// Configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioType::Ratio => "ratio",
            RatioType::SoverB => "SoverB",
            RatioType::Signif => "signif",
        }
    }

    /// SoverB and signif are computed from the first signal histogram.
    pub fn requires_signal(&self) -> bool {
        !matches!(self, RatioType::Ratio)
    }

    /// Default y-axis title.
    pub fn y_title(&self) -> &'static str {
        match self {
            RatioType::Ratio => "Data / Pred.",
            RatioType::SoverB => "S/\u{221A}B",
            RatioType::Signif => "Z_A",
        }
    }

    /// Default y-axis range `(min, max)`.
    pub fn default_range(&self) -> (f64, f64) {
        match self {
            RatioType::Ratio => (0.0, 2.0),
            RatioType::SoverB | RatioType::Signif => (0.0, 1.5),
        }
    }

    /// Height of the horizontal guide line.
    pub fn reference_line(&self) -> f64 {
        match self {
            RatioType::Ratio => 1.0,
            RatioType::SoverB | RatioType::Signif => 3.0,
        }
    }
}

impl FromStr for RatioType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ratio" => Ok(RatioType::Ratio),
            "SoverB" => Ok(RatioType::SoverB),
            "signif" => Ok(RatioType::Signif),
            other => Err(Error::Config(format!(
                "ratio_type is only 'SoverB', 'ratio' or 'signif', but not '{other}'"
            ))),
        }
    }
}

impl fmt::Display for RatioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RatioType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RatioType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `s / sqrt(b + berr²)`; non-finite results become 0.
pub fn s_over_b(s: f64, b: f64, berr: f64) -> f64 {
    let v = s / (b + berr * berr).sqrt();
    if v.is_finite() { v } else { 0.0 }
}

/// Asymptotic discovery significance with background uncertainty:
///
/// ```text
/// t1 = (s+b)·ln[(s+b)(b+σ²) / (b² + (s+b)σ²)]
/// t2 = (b²/σ²)·ln[1 + σ²·s / (b(b+σ²))]
/// Z  = sqrt(2(t1 − t2))
/// ```
///
/// A term whose expression divides by zero counts as 0; a non-finite or
/// negative radicand gives 0.
pub fn asimov_significance(s: f64, b: f64, berr: f64) -> f64 {
    let berr2 = berr * berr;

    let denom1 = b * b + (s + b) * berr2;
    let term1 = if denom1 == 0.0 {
        0.0
    } else {
        (s + b) * ((s + b) * (b + berr2) / denom1).ln()
    };

    let term2 = if berr2 == 0.0 || b == 0.0 || b + berr2 == 0.0 {
        0.0
    } else {
        b * b / berr2 * (1.0 + berr2 * s / b / (b + berr2)).ln()
    };

    let sig2 = 2.0 * (term1 - term2);
    if sig2.is_finite() && sig2 >= 0.0 { sig2.sqrt() } else { 0.0 }
}

/// Derived bottom-panel histograms plus their axis decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioPanel {
    /// Panel mode.
    pub kind: RatioType,
    /// Ratio mode: prediction band around 1. Other modes: the per-bin metric.
    pub band: Histogram,
    /// Ratio mode only: data / prediction points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Histogram>,
    /// Y-axis title.
    pub y_title: String,
    /// Y-axis minimum.
    pub y_min: f64,
    /// Y-axis maximum.
    pub y_max: f64,
    /// Height of the horizontal guide line.
    pub reference_line: f64,
}

impl RatioPanel {
    /// Build the panel from the total prediction, data and (for SoverB and
    /// signif) the first signal. Explicit `y_min`/`y_max` override the
    /// mode defaults.
    pub fn build(
        kind: RatioType,
        total: &Histogram,
        data: &Histogram,
        signal: Option<&Histogram>,
        y_min: Option<f64>,
        y_max: Option<f64>,
    ) -> Result<Self> {
        let (band, points) = match kind {
            RatioType::Ratio => {
                let (band, points) = data_over_prediction(total, data)?;
                (band, Some(points))
            }
            RatioType::SoverB | RatioType::Signif => {
                let signal = signal.ok_or_else(|| missing_signal(kind))?;
                (signal_metric(kind, total, signal)?, None)
            }
        };
        let (def_min, def_max) = kind.default_range();
        Ok(Self {
            kind,
            band,
            points,
            y_title: kind.y_title().to_string(),
            y_min: y_min.unwrap_or(def_min),
            y_max: y_max.unwrap_or(def_max),
            reference_line: kind.reference_line(),
        })
    }
}

pub(crate) fn missing_signal(kind: RatioType) -> Error {
    Error::Config(format!("ratio_type '{kind}' is not supported when no signal is specified"))
}

/// Ratio-mode histograms: the relative prediction band and data / prediction.
///
/// Visible bins with a prediction below 0.001 keep the prediction content
/// and get zero error on both band and points.
fn data_over_prediction(total: &Histogram, data: &Histogram) -> Result<(Histogram, Histogram)> {
    let mut points = data.clone();
    points.set_name(format!("{}_over_{}", data.name(), total.name()));
    points.divide(total)?;
    let mut points = remove_zero_entries(points, RATIO_HIDE_THRESHOLD);

    let mut band = total.clone();
    band.set_name("hmc_err");
    for i in 1..=total.n_bins() {
        let pred = total.bin_content(i);
        if pred < EMPTY_PREDICTION {
            band.set_bin_error(i, 0.0);
            points.set_bin_error(i, 0.0);
        } else {
            band.set_bin_content(i, 1.0);
            band.set_bin_error(i, total.bin_error(i) / pred);
            points.set_bin_error(i, data.bin_error(i) / pred);
        }
    }
    Ok((band, points))
}

/// SoverB/signif histogram: one metric value per visible bin, no errors.
fn signal_metric(kind: RatioType, total: &Histogram, signal: &Histogram) -> Result<Histogram> {
    total.check_binning(signal)?;
    let mut out = total.clone();
    out.set_name(format!("{}_{}", signal.name(), kind));
    for i in 0..=total.n_bins() + 1 {
        out.set_bin_error(i, 0.0);
    }
    out.set_bin_content(0, 0.0);
    out.set_bin_content(total.n_bins() + 1, 0.0);
    for i in 1..=total.n_bins() {
        let s = signal.bin_content(i);
        let b = total.bin_content(i);
        let berr = total.bin_error(i);
        let v = match kind {
            RatioType::SoverB => s_over_b(s, b, berr),
            _ => asimov_significance(s, b, berr),
        };
        out.set_bin_content(i, v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_bin(name: &str, c: f64, e: f64) -> Histogram {
        Histogram::from_parts(name, vec![0.0, 1.0], vec![0.0, c, 0.0], vec![0.0, e, 0.0]).unwrap()
    }

    #[test]
    fn parse_ratio_types() {
        assert_eq!("ratio".parse::<RatioType>().unwrap(), RatioType::Ratio);
        assert_eq!("SoverB".parse::<RatioType>().unwrap(), RatioType::SoverB);
        assert_eq!("signif".parse::<RatioType>().unwrap(), RatioType::Signif);
    }

    #[test]
    fn unknown_ratio_type_is_config_error() {
        let err = "bogus".parse::<RatioType>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("but not 'bogus'"));
        // case matters, as in configuration files
        assert!("soverb".parse::<RatioType>().is_err());
    }

    #[test]
    fn s_over_b_values() {
        // berr enters squared next to B, not multiplied by it
        assert_abs_diff_eq!(s_over_b(5.0, 10.0, 1.0), 5.0 / 11f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(s_over_b(5.0, 10.0, 1.0), 1.5076, epsilon = 1e-4);
        assert_abs_diff_eq!(s_over_b(5.0, 0.0, 0.0), 0.0);
        assert_abs_diff_eq!(s_over_b(0.0, 0.0, 0.0), 0.0);
        assert_abs_diff_eq!(s_over_b(1.0, -4.0, 0.0), 0.0);
    }

    #[test]
    fn signif_without_signal_is_zero() {
        for b in [0.0, 0.5, 10.0, 1e4] {
            for berr in [0.0, 1.0, 3.0] {
                assert_abs_diff_eq!(asimov_significance(0.0, b, berr), 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn signif_degenerate_bins_do_not_panic() {
        assert_abs_diff_eq!(asimov_significance(5.0, 0.0, 0.0), 0.0);
        assert!(asimov_significance(5.0, 0.0, 1.0).is_finite());
        assert!(asimov_significance(5.0, 10.0, 0.0).is_finite());
        assert_abs_diff_eq!(asimov_significance(f64::NAN, 10.0, 1.0), 0.0);
    }

    #[test]
    fn signif_zero_uncertainty_drops_second_term() {
        let (s, b) = (5.0_f64, 10.0_f64);
        let want = (2.0 * (s + b) * (1.0 + s / b).ln()).sqrt();
        assert_abs_diff_eq!(asimov_significance(s, b, 0.0), want, epsilon = 1e-12);
    }

    #[test]
    fn signif_small_uncertainty_approaches_simple_formula() {
        let (s, b) = (5.0_f64, 100.0_f64);
        let simple = (2.0 * ((s + b) * (1.0 + s / b).ln() - s)).sqrt();
        assert_abs_diff_eq!(asimov_significance(s, b, 1e-3), simple, epsilon = 1e-3);
        assert!(asimov_significance(s, b, 10.0) < simple);
    }

    #[test]
    fn ratio_mode_example_bin() {
        let total = one_bin("tot", 10.0, 1.0);
        let data = one_bin("data", 12.0, 12f64.sqrt());
        let panel = RatioPanel::build(RatioType::Ratio, &total, &data, None, None, None).unwrap();
        let points = panel.points.as_ref().unwrap();
        assert_abs_diff_eq!(points.bin_content(1), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(points.bin_error(1), 12f64.sqrt() / 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(panel.band.bin_content(1), 1.0);
        assert_abs_diff_eq!(panel.band.bin_error(1), 0.1, epsilon = 1e-12);
        assert_eq!((panel.y_min, panel.y_max), (0.0, 2.0));
        assert_abs_diff_eq!(panel.reference_line, 1.0);
        assert_eq!(panel.y_title, "Data / Pred.");
    }

    #[test]
    fn ratio_mode_empty_prediction_has_no_error() {
        let total = one_bin("tot", 0.0, 0.0);
        let data = one_bin("data", 3.0, 3f64.sqrt());
        let panel = RatioPanel::build(RatioType::Ratio, &total, &data, None, None, None).unwrap();
        assert_abs_diff_eq!(panel.band.bin_error(1), 0.0);
        assert_abs_diff_eq!(panel.band.bin_content(1), 0.0);
        let points = panel.points.unwrap();
        assert_abs_diff_eq!(points.bin_error(1), 0.0);
        assert_abs_diff_eq!(points.bin_content(1), hp_hist::DATA_SENTINEL);
    }

    #[test]
    fn ratio_mode_hides_empty_data() {
        let total = one_bin("tot", 10.0, 1.0);
        let data = one_bin("data", 0.0, 0.0);
        let panel = RatioPanel::build(RatioType::Ratio, &total, &data, None, None, None).unwrap();
        assert_abs_diff_eq!(panel.points.unwrap().bin_content(1), hp_hist::DATA_SENTINEL);
    }

    #[test]
    fn soverb_panel_defaults() {
        let total = one_bin("tot", 10.0, 1.0);
        let data = one_bin("data", 12.0, 3.0);
        let sig = one_bin("sig", 5.0, 1.0);
        let panel =
            RatioPanel::build(RatioType::SoverB, &total, &data, Some(&sig), None, Some(4.0))
                .unwrap();
        assert_abs_diff_eq!(panel.band.bin_content(1), 5.0 / 11f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(panel.band.bin_error(1), 0.0);
        assert!(panel.points.is_none());
        assert_eq!((panel.y_min, panel.y_max), (0.0, 4.0));
        assert_abs_diff_eq!(panel.reference_line, 3.0);
    }

    #[test]
    fn metric_modes_need_a_signal() {
        let total = one_bin("tot", 10.0, 1.0);
        let data = one_bin("data", 12.0, 3.0);
        for kind in [RatioType::SoverB, RatioType::Signif] {
            let err = RatioPanel::build(kind, &total, &data, None, None, None).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn signif_panel_zero_background_bin() {
        let edges = vec![0.0, 1.0, 2.0];
        let total =
            Histogram::from_parts("tot", edges.clone(), vec![0.0; 4], vec![0.0; 4]).unwrap();
        let sig =
            Histogram::from_parts("sig", edges, vec![0.0, 2.0, 0.0, 0.0], vec![0.0; 4]).unwrap();
        let panel =
            RatioPanel::build(RatioType::Signif, &total, &total, Some(&sig), None, None).unwrap();
        assert_abs_diff_eq!(panel.band.bin_content(1), 0.0);
        assert_abs_diff_eq!(panel.band.bin_content(2), 0.0);
    }
}
