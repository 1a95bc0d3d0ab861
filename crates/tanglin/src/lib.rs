#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tanglin-labs/tanglin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use tanglin_data as data;
pub use tanglin_model as model;
pub use tanglin_output as output;

// Re-export the pipeline surface
pub use data::{DomainCatalog, PropertyQuery, RawPropertyQuery, ValidationError};
pub use model::{PredictionResult, ScoringModel};
pub use pipeline::{Pipeline, PipelineError, PredictError};

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
