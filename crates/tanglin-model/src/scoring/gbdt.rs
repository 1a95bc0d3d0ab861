//! Gradient-boosted tree ensemble evaluation.

use crate::encoder::{FeatureVector, ScalerStats};
use crate::scoring::artifact::{ArtifactError, ModelArtifact, Node, Tree, Vocabulary};
use crate::scoring::{ScoringError, ScoringModel};
use std::path::Path;

/// A pretrained gradient-boosted regression ensemble.
///
/// Built from a validated [`ModelArtifact`]; immutable thereafter, so a
/// single instance can be shared read-only across requests.
#[derive(Debug, Clone)]
pub struct GbdtModel {
    name: String,
    base_score: f64,
    trees: Vec<Tree>,
    vocabulary: Vocabulary,
    scaler: Option<ScalerStats>,
}

impl GbdtModel {
    /// Build a model from a validated artifact.
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            name: artifact.metadata.name,
            base_score: artifact.metadata.base_score,
            trees: artifact.trees,
            vocabulary: artifact.vocabulary,
            scaler: artifact.scaler,
        }
    }

    /// Load, validate, and build a model from an artifact file.
    ///
    /// This is the one-time process-lifetime initialization; per-request
    /// scoring never touches the filesystem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        Ok(Self::from_artifact(ModelArtifact::from_path(path)?))
    }

    /// The categorical training vocabulary, for encoder wiring.
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Fitted scaler moments, when the artifact carries them.
    pub const fn scaler(&self) -> Option<&ScalerStats> {
        self.scaler.as_ref()
    }

    /// Number of trees in the ensemble.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Walk one tree to its leaf. Child indices were validated at load to
    /// point strictly forward, so the walk always terminates.
    fn evaluate(tree: &Tree, features: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::NumericSplit {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.numeric(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::CategorySplit {
                    feature,
                    members,
                    left,
                    right,
                } => {
                    let label = features.categorical(*feature);
                    index = if members.iter().any(|m| m == label) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl ScoringModel for GbdtModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        let total = self
            .trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + Self::evaluate(tree, features));
        if !total.is_finite() {
            return Err(ScoringError::NonFiniteScore { value: total });
        }
        Ok(total)
    }
}
