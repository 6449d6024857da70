//! Input files of the `plot` subcommand.

use std::path::Path;

use anyhow::{Context, Result};
use hp_hist::{Histogram, add_flat_syst, sum_histograms};
use hp_viz::{BackgroundEntry, ComparisonInputs, SignalEntry};
use serde::Deserialize;

/// Histograms and styling of one comparison plot.
///
/// `total` may be omitted; it is then the sum of the backgrounds, with
/// `flat_syst` (relative, e.g. `0.15`) added to its errors.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotInputFile {
    pub backgrounds: Vec<BackgroundEntry>,
    pub data: Histogram,
    #[serde(default)]
    pub total: Option<Histogram>,
    #[serde(default)]
    pub flat_syst: Option<f64>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
}

impl PlotInputFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse input file {}", path.display()))
    }

    pub fn into_inputs(self) -> Result<ComparisonInputs> {
        let total = match self.total {
            Some(total) => total,
            None => {
                let hists: Vec<Histogram> =
                    self.backgrounds.iter().map(|b| b.histogram.clone()).collect();
                let total = sum_histograms(&hists, "tot")?;
                match self.flat_syst {
                    Some(s) => add_flat_syst(&total, s, "syst"),
                    None => total,
                }
            }
        };
        Ok(ComparisonInputs {
            backgrounds: self.backgrounds,
            total,
            data: self.data,
            signals: self.signals,
        })
    }
}

/// Histograms to combine, as a JSON array.
pub fn load_histograms(path: &Path) -> Result<Vec<Histogram>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read histograms from {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse histograms from {}", path.display()))
}

pub fn load_histogram(path: &Path) -> Result<Histogram> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read histogram from {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse histogram from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r##"{
        "backgrounds": [
            {"name": "a", "color": "#112233", "legend": "A",
             "histogram": {"name": "a", "bin_edges": [0, 1, 2], "contents": [4, 9]}},
            {"name": "b", "color": "#445566", "legend": "B",
             "histogram": {"name": "b", "bin_edges": [0, 1, 2], "contents": [0, 16]}}
        ],
        "data": {"name": "data", "bin_edges": [0, 1, 2], "contents": [5, 20]},
        "flat_syst": 0.5
    }"##;

    #[test]
    fn missing_total_is_summed_with_syst() {
        let file: PlotInputFile = serde_json::from_str(INPUT).unwrap();
        let inputs = file.into_inputs().unwrap();
        assert_eq!(inputs.total.name(), "tot_syst");
        assert_eq!(inputs.total.bin_content(2), 25.0);
        // stat 5 (quadrature of 3 and 4) and syst 12.5
        let want = (25.0_f64 + 12.5 * 12.5).sqrt();
        assert!((inputs.total.bin_error(2) - want).abs() < 1e-9);
        assert!(inputs.signals.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let bad = INPUT.replace("flat_syst", "flat_sys");
        assert!(serde_json::from_str::<PlotInputFile>(&bad).is_err());
    }
}
