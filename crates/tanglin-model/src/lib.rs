#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tanglin-labs/tanglin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod interval;
pub mod scoring;

pub use encoder::{
    CategoricalFeature, Encoder, EncodingError, FeatureMoments, FeatureVector, NumericFeature,
    ScalerMode, ScalerStats,
};
pub use interval::{DEFAULT_MARGIN, IntervalError, IntervalEstimator, PredictionResult};
pub use scoring::{ArtifactError, GbdtModel, ModelArtifact, ScoringError, ScoringModel, Vocabulary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
