//! # hp-hist
//!
//! Binned 1D histograms and the bin-by-bin utilities used to prepare
//! comparison plots: summation, flat systematics, axis rescaling.
//!
//! Bin numbering follows ROOT: bin 0 is the underflow, bins `1..=n_bins`
//! are visible and bin `n_bins + 1` is the overflow.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Histogram container.
pub mod histogram;

/// Stateless histogram transforms.
pub mod ops;

pub use histogram::Histogram;
pub use ops::{
    DATA_SENTINEL, add_flat_syst, normalize_to, remove_zero_entries, scale_xaxis, sum_histograms,
};
