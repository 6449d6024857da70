//! Histogram utilities: summation, flat systematics, x-axis rescaling and
//! data clean-up. All functions return new histograms unless noted.

use hp_core::{Error, Result};

use crate::histogram::Histogram;

/// Content assigned to bins hidden by [`remove_zero_entries`]; far below
/// any sensible axis range so the marker never shows up.
pub const DATA_SENTINEL: f64 = -1e5;

/// Sum an ordered list of same-binning histograms.
///
/// Contents add arithmetically and errors add in quadrature. The result is
/// named `name`.
pub fn sum_histograms(histograms: &[Histogram], name: &str) -> Result<Histogram> {
    let (first, rest) = histograms
        .split_first()
        .ok_or_else(|| Error::Validation("cannot sum an empty list of histograms".into()))?;
    let mut total = first.clone();
    for h in rest {
        total.add(h)?;
    }
    total.set_name(name);
    tracing::debug!(
        name,
        n_inputs = histograms.len(),
        integral = total.integral(),
        "summed histograms"
    );
    Ok(total)
}

/// Inflate every bin error with a flat relative systematic `s`
/// (`0.15` for 15%): `err' = sqrt(err² + (content·s)²)`.
///
/// The copy is named `<name>_<suffix>`; `s == 0` returns it unchanged.
/// Every bin is inflated, underflow and overflow included, so a later
/// overflow fold carries the systematic with it.
pub fn add_flat_syst(h: &Histogram, s: f64, suffix: &str) -> Histogram {
    let mut out = h.clone();
    out.set_name(format!("{}_{}", h.name(), suffix));
    if s == 0.0 {
        return out;
    }
    for i in 0..=h.n_bins() + 1 {
        let val = h.bin_content(i);
        let err = h.bin_error(i);
        out.set_bin_error(i, (err * err + (val * s) * (val * s)).sqrt());
    }
    out
}

/// Rescale the x-axis calibration by `scale` (e.g. MeV → GeV with 1e-3),
/// keeping every bin content and error.
///
/// With `add_overflow` the overflow is folded into the last visible bin
/// (errors in quadrature) and then zeroed.
pub fn scale_xaxis(h: &Histogram, scale: f64, add_overflow: bool) -> Result<Histogram> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::Validation(format!("x-axis scale must be positive, got {scale}")));
    }
    let edges: Vec<f64> = h.bin_edges().iter().map(|e| e * scale).collect();
    let n = h.n_bins();
    let mut contents = h.contents().to_vec();
    let mut errors: Vec<f64> = (0..=n + 1).map(|i| h.bin_error(i)).collect();
    if add_overflow {
        let (n_last, e_last) = (contents[n], errors[n]);
        let (n_of, e_of) = (contents[n + 1], errors[n + 1]);
        contents[n] = n_last + n_of;
        errors[n] = (e_last * e_last + e_of * e_of).sqrt();
        contents[n + 1] = 0.0;
        errors[n + 1] = 0.0;
    }
    Ok(Histogram::from_parts(format!("{}_goodbin", h.name()), edges, contents, errors)?
        .with_title(h.title()))
}

/// Hide data bins (visible and overflow) whose content is below `threshold`
/// by moving them to [`DATA_SENTINEL`] with zero error.
pub fn remove_zero_entries(mut h: Histogram, threshold: f64) -> Histogram {
    for i in 1..=h.n_bins() + 1 {
        if h.bin_content(i) < threshold {
            h.set_bin_content(i, DATA_SENTINEL);
            h.set_bin_error(i, 0.0);
        }
    }
    h
}

/// Scale `h` in place so its integral (flows included) equals `target`.
///
/// A histogram with a non-positive integral is scaled to zero.
pub fn normalize_to(h: &mut Histogram, target: f64) {
    let integral = h.integral();
    if integral > 0.0 {
        h.scale(target / integral);
    } else {
        tracing::warn!(histogram = h.name(), integral, "non-positive integral, scaling to zero");
        h.scale(0.0);
    }
}
