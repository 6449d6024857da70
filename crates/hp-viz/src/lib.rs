//! # hp-viz
//!
//! Visualization data artifacts for hepplotting.
//!
//! This crate decides *what* a comparison plot shows (stack order, ranges,
//! legend, ratio/significance panel) and emits it as a plot-friendly,
//! serializable structure. Drawing lives in `hp-viz-render`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Stacked background / data / signal comparison artifact.
pub mod comparison;

/// Canvas, pad, legend and label placement rules.
pub mod layout;

/// Recognized plot options and their defaults.
pub mod options;

/// Ratio and significance sub-panel computation.
pub mod ratio;

pub use comparison::{
    BackgroundEntry, ComparisonArtifact, ComparisonInputs, OutputPaths, SignalEntry, output_paths,
};
pub use options::PlotOptions;
pub use ratio::{RatioPanel, RatioType, asimov_significance, s_over_b};
