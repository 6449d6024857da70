//! Public histogram type shared by every stage of the plotting pipeline.

use hp_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Relative tolerance when comparing bin edges of two histograms.
const EDGE_RTOL: f64 = 1e-9;

/// A 1D histogram with fixed binning and explicit underflow/overflow bins.
///
/// Per-bin errors are stored as sum of weights squared, so adding two
/// histograms adds their errors in quadrature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramRepr", into = "HistogramRepr")]
pub struct Histogram {
    name: String,
    title: String,
    /// Bin edges (length = n_bins + 1).
    bin_edges: Vec<f64>,
    /// Bin contents (length = n_bins + 2, including under/overflow).
    contents: Vec<f64>,
    /// Sum of weights squared (length = n_bins + 2).
    sumw2: Vec<f64>,
}

/// Wire form of [`Histogram`].
///
/// `contents` may hold either `n_bins` values (flows set to zero) or
/// `n_bins + 2` values. Missing `errors` default to `sqrt(max(content, 0))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistogramRepr {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    title: String,
    bin_edges: Vec<f64>,
    contents: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<f64>>,
}

impl TryFrom<HistogramRepr> for Histogram {
    type Error = Error;

    fn try_from(repr: HistogramRepr) -> Result<Self> {
        let n_bins = repr.bin_edges.len().saturating_sub(1);
        let pad = |v: Vec<f64>| -> Vec<f64> {
            if v.len() == n_bins {
                std::iter::once(0.0).chain(v).chain(std::iter::once(0.0)).collect()
            } else {
                v
            }
        };
        let contents = pad(repr.contents);
        let errors = match repr.errors {
            Some(e) => pad(e),
            None => contents.iter().map(|c| c.max(0.0).sqrt()).collect(),
        };
        let mut h = Histogram::from_parts(repr.name, repr.bin_edges, contents, errors)?;
        h.title = repr.title;
        Ok(h)
    }
}

impl From<Histogram> for HistogramRepr {
    fn from(h: Histogram) -> Self {
        let errors = h.sumw2.iter().map(|w| w.sqrt()).collect();
        Self {
            name: h.name,
            title: h.title,
            bin_edges: h.bin_edges,
            contents: h.contents,
            errors: Some(errors),
        }
    }
}

fn validate_edges(name: &str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::Validation(format!(
            "histogram '{name}' needs at least 2 bin edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::Validation(format!("histogram '{name}' has non-finite bin edges")));
    }
    if edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::Validation(format!(
            "histogram '{name}' bin edges must be strictly increasing"
        )));
    }
    Ok(())
}

impl Histogram {
    /// Equal-width binning over `[x_min, x_max)`.
    pub fn uniform(name: impl Into<String>, n_bins: usize, x_min: f64, x_max: f64) -> Result<Self> {
        let name = name.into();
        if n_bins == 0 {
            return Err(Error::Validation(format!("histogram '{name}' needs n_bins > 0")));
        }
        let width = (x_max - x_min) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| x_min + width * i as f64).collect();
        edges.push(x_max);
        Self::with_edges(name, edges)
    }

    /// Empty histogram over explicit (possibly variable-width) bin edges.
    pub fn with_edges(name: impl Into<String>, bin_edges: Vec<f64>) -> Result<Self> {
        let name = name.into();
        validate_edges(&name, &bin_edges)?;
        let n = bin_edges.len() + 1;
        Ok(Self { name, title: String::new(), bin_edges, contents: vec![0.0; n], sumw2: vec![0.0; n] })
    }

    /// Build from contents and errors, both including under/overflow.
    pub fn from_parts(
        name: impl Into<String>,
        bin_edges: Vec<f64>,
        contents: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        validate_edges(&name, &bin_edges)?;
        let n = bin_edges.len() + 1;
        if contents.len() != n || errors.len() != n {
            return Err(Error::Validation(format!(
                "histogram '{name}': expected {n} contents/errors (with flows), got {}/{}",
                contents.len(),
                errors.len()
            )));
        }
        let sumw2 = errors.iter().map(|e| e * e).collect();
        Ok(Self { name, title: String::new(), bin_edges, contents, sumw2 })
    }

    /// Builder-style title setter.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Histogram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the histogram.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Histogram title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of visible bins.
    pub fn n_bins(&self) -> usize {
        self.bin_edges.len() - 1
    }

    /// Bin edges (length = n_bins + 1).
    pub fn bin_edges(&self) -> &[f64] {
        &self.bin_edges
    }

    /// Lower edge of the first visible bin.
    pub fn x_min(&self) -> f64 {
        self.bin_edges[0]
    }

    /// Upper edge of the last visible bin.
    pub fn x_max(&self) -> f64 {
        self.bin_edges[self.n_bins()]
    }

    /// Lower edge of bin `i`. The overflow bin starts at `x_max`; the
    /// underflow bin has no lower edge.
    pub fn bin_low_edge(&self, i: usize) -> f64 {
        match i {
            0 => f64::NEG_INFINITY,
            i if i <= self.n_bins() + 1 => self.bin_edges[i - 1],
            _ => f64::NAN,
        }
    }

    /// Width of visible bin `i`, zero for flow bins.
    pub fn bin_width(&self, i: usize) -> f64 {
        if (1..=self.n_bins()).contains(&i) {
            self.bin_edges[i] - self.bin_edges[i - 1]
        } else {
            0.0
        }
    }

    /// Center of visible bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.bin_low_edge(i) + 0.5 * self.bin_width(i)
    }

    /// Bin number holding `x` (0 for underflow, n_bins + 1 for overflow).
    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.x_min() {
            0
        } else if x >= self.x_max() || x.is_nan() {
            self.n_bins() + 1
        } else {
            self.bin_edges.partition_point(|&e| e <= x)
        }
    }

    /// Add one unit-weight entry at `x`.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    /// Add a weighted entry at `x`.
    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        let i = self.find_bin(x);
        self.contents[i] += w;
        self.sumw2[i] += w * w;
    }

    /// Content of bin `i`; zero outside `0..=n_bins + 1`.
    pub fn bin_content(&self, i: usize) -> f64 {
        self.contents.get(i).copied().unwrap_or(0.0)
    }

    /// Error (standard deviation) of bin `i`; zero outside `0..=n_bins + 1`.
    pub fn bin_error(&self, i: usize) -> f64 {
        self.sumw2.get(i).map(|w| w.sqrt()).unwrap_or(0.0)
    }

    /// Set content of bin `i`. Out-of-range indices are ignored.
    pub fn set_bin_content(&mut self, i: usize, value: f64) {
        if let Some(c) = self.contents.get_mut(i) {
            *c = value;
        }
    }

    /// Set error of bin `i`. Out-of-range indices are ignored.
    pub fn set_bin_error(&mut self, i: usize, error: f64) {
        if let Some(w) = self.sumw2.get_mut(i) {
            *w = error * error;
        }
    }

    /// All contents, flows included.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Contents of the visible bins.
    pub fn visible_contents(&self) -> &[f64] {
        &self.contents[1..=self.n_bins()]
    }

    /// True when both histograms share bin boundaries.
    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.bin_edges.len() == other.bin_edges.len()
            && self.bin_edges.iter().zip(&other.bin_edges).all(|(a, b)| {
                let scale = a.abs().max(b.abs()).max(1.0);
                (a - b).abs() <= EDGE_RTOL * scale
            })
    }

    /// Error out unless both histograms share bin boundaries.
    pub fn check_binning(&self, other: &Histogram) -> Result<()> {
        if self.same_binning(other) {
            Ok(())
        } else {
            Err(Error::BinningMismatch { left: self.name.clone(), right: other.name.clone() })
        }
    }

    /// Bin-by-bin addition; errors add in quadrature.
    pub fn add(&mut self, other: &Histogram) -> Result<()> {
        self.check_binning(other)?;
        for (c, o) in self.contents.iter_mut().zip(&other.contents) {
            *c += o;
        }
        for (w, o) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *w += o;
        }
        Ok(())
    }

    /// Bin-by-bin division by `other` with uncorrelated error propagation.
    ///
    /// Bins with a zero denominator get zero content and zero error.
    pub fn divide(&mut self, other: &Histogram) -> Result<()> {
        self.check_binning(other)?;
        for i in 0..self.contents.len() {
            let c1 = self.contents[i];
            let c2 = other.contents[i];
            if c2 == 0.0 {
                self.contents[i] = 0.0;
                self.sumw2[i] = 0.0;
                continue;
            }
            let e1sq = self.sumw2[i];
            let e2sq = other.sumw2[i];
            let c2sq = c2 * c2;
            self.contents[i] = c1 / c2;
            self.sumw2[i] = (e1sq * c2sq + e2sq * c1 * c1) / (c2sq * c2sq);
        }
        Ok(())
    }

    /// Multiply contents by `factor` (errors scale by `|factor|`).
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        let f2 = factor * factor;
        for w in &mut self.sumw2 {
            *w *= f2;
        }
    }

    /// Sum of contents over every bin, flows included.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Integral over every bin (flows included) and its quadrature error.
    pub fn integral_and_error(&self) -> (f64, f64) {
        (self.integral(), self.sumw2.iter().sum::<f64>().sqrt())
    }

    /// Largest `content + error` over the visible bins.
    pub fn max_visible_with_error(&self) -> f64 {
        (1..=self.n_bins())
            .map(|i| self.bin_content(i) + self.bin_error(i))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
