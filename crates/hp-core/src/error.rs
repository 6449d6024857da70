//! Error types for hepplotting

use thiserror::Error;

/// hepplotting error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input (empty histogram list, bad edges, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fatal plot configuration error (unknown ratio type, missing signal)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two histograms combined bin-by-bin do not share bin boundaries
    #[error("Binning mismatch: '{left}' vs '{right}'")]
    BinningMismatch {
        /// Name of the left-hand histogram
        left: String,
        /// Name of the right-hand histogram
        right: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binning_mismatch_message_names_both_sides() {
        let e = Error::BinningMismatch { left: "ttbar".into(), right: "data".into() };
        assert_eq!(e.to_string(), "Binning mismatch: 'ttbar' vs 'data'");
    }

    #[test]
    fn config_message_is_prefixed() {
        let e = Error::Config("ratio_type 'x' is not supported".into());
        assert_eq!(e.to_string(), "Configuration error: ratio_type 'x' is not supported");
    }
}
