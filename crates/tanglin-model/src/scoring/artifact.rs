//! Serialized model artifact: schema, loading, and load-time validation.
//!
//! The artifact is a JSON document produced by the training toolchain. It
//! carries the ensemble itself plus everything the pipeline needs to wire
//! an encoder: the categorical training vocabulary and, optionally, fitted
//! scaler moments. Every structural property the evaluator relies on is
//! checked here, once, so scoring never fails on a malformed tree
//! mid-request.

use crate::encoder::{CategoricalFeature, NumericFeature, ScalerStats};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Artifact loading and validation failures. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error reading the artifact file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or schema mismatch
    #[error("Artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Ensemble has no trees
    #[error("Artifact {name:?} has no trees")]
    EmptyEnsemble {
        /// Artifact name from metadata.
        name: String,
    },

    /// A tree has no nodes
    #[error("Tree {tree} is empty")]
    EmptyTree {
        /// Index of the offending tree.
        tree: usize,
    },

    /// A branch points at an out-of-range or non-forward child
    #[error("Tree {tree} node {node}: child index {child} invalid (must be in ({node}, {len}))")]
    BadChildIndex {
        /// Index of the offending tree.
        tree: usize,
        /// Index of the branch node.
        node: usize,
        /// The rejected child index.
        child: usize,
        /// Node count of the tree.
        len: usize,
    },

    /// The base score is NaN or infinite
    #[error("Non-finite base score {value}")]
    NonFiniteBaseScore {
        /// The rejected value.
        value: f64,
    },

    /// A numeric value inside a tree is NaN or infinite
    #[error("Tree {tree} node {node}: non-finite value {value}")]
    NonFiniteValue {
        /// Index of the offending tree.
        tree: usize,
        /// Index of the offending node.
        node: usize,
        /// The rejected value.
        value: f64,
    },

    /// A categorical split references a label outside the vocabulary
    #[error("Tree {tree} node {node}: split member {member:?} not in vocabulary")]
    UnknownSplitMember {
        /// Index of the offending tree.
        tree: usize,
        /// Index of the branch node.
        node: usize,
        /// The out-of-vocabulary label.
        member: String,
    },

    /// A categorical split has no members
    #[error("Tree {tree} node {node}: category split has no members")]
    EmptySplit {
        /// Index of the offending tree.
        tree: usize,
        /// Index of the branch node.
        node: usize,
    },
}

/// Categorical labels seen at training time, per feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    flat_type: Vec<String>,
    town: Vec<String>,
    storey_range: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from per-feature label lists.
    pub const fn new(flat_type: Vec<String>, town: Vec<String>, storey_range: Vec<String>) -> Self {
        Self {
            flat_type,
            town,
            storey_range,
        }
    }

    /// Labels of one categorical feature.
    pub fn labels(&self, feature: CategoricalFeature) -> &[String] {
        match feature {
            CategoricalFeature::FlatType => &self.flat_type,
            CategoricalFeature::Town => &self.town,
            CategoricalFeature::StoreyRange => &self.storey_range,
        }
    }

    /// Whether `label` was seen at training time for `feature`.
    pub fn contains(&self, feature: CategoricalFeature, label: &str) -> bool {
        self.labels(feature).iter().any(|l| l == label)
    }

    #[cfg(test)]
    pub(crate) fn reference_test_fixture() -> Self {
        Self::new(
            vec![
                "1 Room", "2 Room", "3 Room", "4 Room", "5 Room", "Executive",
                "Multi-Generation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec!["Ang Mo Kio", "Bedok", "Punggol", "Tampines", "Yishun"]
                .into_iter()
                .map(String::from)
                .collect(),
            vec!["01 To 03", "04 To 06", "07 To 09", "10 To 12"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

/// Descriptive artifact metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Model name.
    pub name: String,
    /// Training toolchain version tag, if recorded.
    #[serde(default)]
    pub version: Option<String>,
    /// Prediction target column.
    #[serde(default)]
    pub target: Option<String>,
    /// Additive baseline before any tree contributions.
    pub base_score: f64,
}

/// One node of a decision tree, addressed by index within the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Branch on a standardized numeric feature: `value <= threshold` goes
    /// left, otherwise right.
    NumericSplit {
        /// Feature the split tests.
        feature: NumericFeature,
        /// Split threshold in standardized units.
        threshold: f64,
        /// Child index when the test passes.
        left: usize,
        /// Child index when the test fails.
        right: usize,
    },
    /// Branch on categorical membership: label in `members` goes left,
    /// otherwise right.
    CategorySplit {
        /// Feature the split tests.
        feature: CategoricalFeature,
        /// Labels routed left.
        members: Vec<String>,
        /// Child index when the label is a member.
        left: usize,
        /// Child index otherwise.
        right: usize,
    },
    /// Terminal node contributing `value` to the score.
    Leaf {
        /// Additive contribution.
        value: f64,
    },
}

/// One decision tree; `nodes[0]` is the root and children always point at
/// strictly larger indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Nodes in index order.
    pub nodes: Vec<Node>,
}

/// The full serialized model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Descriptive metadata and the base score.
    pub metadata: ArtifactMetadata,
    /// Categorical training vocabulary.
    pub vocabulary: Vocabulary,
    /// Fitted scaler moments, when the model was trained against a global
    /// scaler. Absent for per-request parity models.
    #[serde(default)]
    pub scaler: Option<ScalerStats>,
    /// The tree ensemble.
    pub trees: Vec<Tree>,
}

impl ModelArtifact {
    /// Parse and validate an artifact from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Parse and validate an artifact from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    /// Check every structural property the evaluator relies on.
    fn validate(&self) -> Result<(), ArtifactError> {
        if !self.metadata.base_score.is_finite() {
            return Err(ArtifactError::NonFiniteBaseScore {
                value: self.metadata.base_score,
            });
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::EmptyEnsemble {
                name: self.metadata.name.clone(),
            });
        }

        for (t, tree) in self.trees.iter().enumerate() {
            let len = tree.nodes.len();
            if len == 0 {
                return Err(ArtifactError::EmptyTree { tree: t });
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Leaf { value } => {
                        if !value.is_finite() {
                            return Err(ArtifactError::NonFiniteValue {
                                tree: t,
                                node: n,
                                value: *value,
                            });
                        }
                    }
                    Node::NumericSplit {
                        threshold,
                        left,
                        right,
                        ..
                    } => {
                        if !threshold.is_finite() {
                            return Err(ArtifactError::NonFiniteValue {
                                tree: t,
                                node: n,
                                value: *threshold,
                            });
                        }
                        Self::check_children(t, n, *left, *right, len)?;
                    }
                    Node::CategorySplit {
                        feature,
                        members,
                        left,
                        right,
                    } => {
                        if members.is_empty() {
                            return Err(ArtifactError::EmptySplit { tree: t, node: n });
                        }
                        let known: HashSet<&str> = self
                            .vocabulary
                            .labels(*feature)
                            .iter()
                            .map(String::as_str)
                            .collect();
                        for member in members {
                            if !known.contains(member.as_str()) {
                                return Err(ArtifactError::UnknownSplitMember {
                                    tree: t,
                                    node: n,
                                    member: member.clone(),
                                });
                            }
                        }
                        Self::check_children(t, n, *left, *right, len)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Children must point strictly forward so every walk terminates.
    const fn check_children(
        tree: usize,
        node: usize,
        left: usize,
        right: usize,
        len: usize,
    ) -> Result<(), ArtifactError> {
        if left <= node || left >= len {
            return Err(ArtifactError::BadChildIndex {
                tree,
                node,
                child: left,
                len,
            });
        }
        if right <= node || right >= len {
            return Err(ArtifactError::BadChildIndex {
                tree,
                node,
                child: right,
                len,
            });
        }
        Ok(())
    }
}
