//! Self-contained example plot from Gaussian toy histograms.

use anyhow::Result;
use hp_hist::{Histogram, sum_histograms};
use hp_viz::{BackgroundEntry, ComparisonInputs, PlotOptions, RatioType, SignalEntry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

pub const PLOT_NAME: &str = "Example_plot";

const N_BINS: usize = 30;
const X_MIN: f64 = -5.0;
const X_MAX: f64 = 10.0;

/// (name, events, colour, legend)
const BACKGROUNDS: [(&str, usize, &str, &str); 3] = [
    ("bkg1", 246, "#99c2ff", "#chi#bar{#chi} #rightarrow MM"),
    ("bkg2", 251, "#66a3ff", "pp #rightarrow #psi#bar{#psi}"),
    ("bkg3", 252, "#3385ff", "H^{+}_{2} with #alpha=1/137"),
];

fn gaussian_histo(name: &str, n: usize, rng: &mut StdRng) -> Result<Histogram> {
    let normal = Normal::new(0.0, 1.0)?;
    let mut h = Histogram::uniform(name, N_BINS, X_MIN, X_MAX)?;
    for _ in 0..n {
        h.fill(normal.sample(rng));
    }
    Ok(h)
}

/// Toy inputs: three backgrounds, one signal and data from three samples.
pub fn demo_inputs(seed: u64) -> Result<ComparisonInputs> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut backgrounds = Vec::with_capacity(BACKGROUNDS.len());
    for (name, n, color, legend) in BACKGROUNDS {
        backgrounds.push(BackgroundEntry {
            name: name.into(),
            histogram: gaussian_histo(name, n, &mut rng)?,
            color: color.into(),
            legend: legend.into(),
        });
    }
    let signal = SignalEntry {
        name: "s".into(),
        histogram: gaussian_histo("s", 52, &mut rng)?,
        color: "#cc0000".into(),
        norm: Some(20.0),
        legend: "M_{Madaron}=1 MeV".into(),
    };

    let samples = (0..3).map(|_| gaussian_histo("Data", 250, &mut rng)).collect::<Result<Vec<_>>>()?;
    let data = sum_histograms(&samples, "Data")?;
    let bkg_hists: Vec<Histogram> = backgrounds.iter().map(|b| b.histogram.clone()).collect();
    let total = sum_histograms(&bkg_hists, "tot")?;

    Ok(ComparisonInputs { backgrounds, total, data, signals: vec![signal] })
}

/// Plot options of the example: significance panel and event counts in the
/// legend.
pub fn demo_options(base: PlotOptions) -> PlotOptions {
    PlotOptions {
        ytitle: Some("Probability Density Function".into()),
        xtitle: Some("Random variable".into()),
        plot_ratio: true,
        ymax: Some(300.0),
        ratio_type: RatioType::Signif,
        leg_ncols: 1,
        leg_put_nevts: true,
        leg_textsize: Some(0.036),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_viz::ComparisonArtifact;

    #[test]
    fn event_counts_match_the_samples() {
        let inputs = demo_inputs(7).unwrap();
        let counts: Vec<f64> = inputs.backgrounds.iter().map(|b| b.histogram.integral()).collect();
        assert_eq!(counts, [246.0, 251.0, 252.0]);
        assert_eq!(inputs.data.integral(), 750.0);
        assert_eq!(inputs.total.integral(), 749.0);
        assert_eq!(inputs.data.n_bins(), 30);
    }

    #[test]
    fn same_seed_same_histograms() {
        let a = demo_inputs(3).unwrap();
        let b = demo_inputs(3).unwrap();
        assert_eq!(a.data, b.data);
        assert_ne!(a.data, demo_inputs(4).unwrap().data);
    }

    #[test]
    fn demo_builds_a_significance_plot() {
        let opts = demo_options(PlotOptions::default());
        let art = ComparisonArtifact::build(&demo_inputs(1).unwrap(), &opts).unwrap();
        let panel = art.ratio.as_ref().unwrap();
        assert_eq!(panel.kind, RatioType::Signif);
        assert_eq!(art.axes.y_max, 300.0);
        // signal normalised to 20 events on a copy
        let sig = &art.signals[0].histogram;
        assert!((sig.integral() - 20.0).abs() < 1e-9);
        assert!(art.legend.entries[0].label.starts_with("Data (750)"));
    }
}
