//! Scoring capability: the opaque boundary between the pipeline and the
//! pretrained model.
//!
//! The pipeline only ever sees [`ScoringModel`]; the concrete
//! [`GbdtModel`] and its serialization format stay behind it, so the model
//! family can change without touching the pipeline.

pub mod artifact;
pub mod gbdt;

pub use artifact::{ArtifactError, ArtifactMetadata, ModelArtifact, Node, Tree, Vocabulary};
pub use gbdt::GbdtModel;

use crate::encoder::FeatureVector;
use thiserror::Error;

/// Per-request scoring failures. Never substituted with a default value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// The ensemble produced a NaN or infinite score
    #[error("Model produced non-finite score: {value}")]
    NonFiniteScore {
        /// The offending score.
        value: f64,
    },

    /// Implementation-specific failure, reserved for [`ScoringModel`]
    /// implementations outside this crate. The built-in GBDT never
    /// constructs it.
    #[error("Scoring failed: {0}")]
    Model(String),
}

/// A pure scoring function over an encoded feature vector.
///
/// Implementations are loaded once at process start and shared read-only
/// across requests; `score` must not mutate observable state.
pub trait ScoringModel: Send + Sync {
    /// Human-readable model identifier.
    fn name(&self) -> &str;

    /// Score one feature vector.
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoringError>;
}
