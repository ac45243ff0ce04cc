//! Decision tree / random forest exported as JSON.
//!
//! ```json
//! {
//!   "schema": { "columns": [{ "name": "Age" }, { "name": "Gender", "categories": ["Female", "Male"] }] },
//!   "n_classes": 2,
//!   "trees": [{ "nodes": [
//!     { "feature": 0, "threshold": 30.5, "left": 1, "right": 2 },
//!     { "value": [8.0, 2.0] },
//!     { "value": [1.0, 9.0] }
//!   ] }]
//! }
//! ```
//!
//! Splits send a row left when `x <= threshold`. Leaves carry per-class
//! weights (sample counts or probabilities). The forest averages each tree's
//! normalised leaf and picks the heaviest class.

use std::path::Path;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{argmax, ClassIndex, Classifier, FeatureSchema};
use crate::error::{ArtifactLoadError, InferenceError};
use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. `None` when the walk leaves the tree,
    /// reads past the row or steps backwards.
    fn leaf(&self, row: &[f32]) -> Option<&[f64]> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx)? {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let next = if f64::from(*row.get(*feature)?) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= idx {
                        return None;
                    }
                    idx = next;
                }
                Node::Leaf { value } => return Some(value),
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, schema has {n_features}"
                        ));
                    }
                    // Children after parents rules out cycles.
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {idx} has {} weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub schema: FeatureSchema,
    pub n_classes: usize,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model
            .validate()
            .map_err(|reason| ArtifactLoadError::invalid(path, reason))?;

        tracing::debug!(
            path = %path.display(),
            trees = model.trees.len(),
            classes = model.n_classes,
            "loaded tree ensemble"
        );
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.n_classes == 0 {
            return Err("n_classes must be positive".to_string());
        }
        if self.schema.is_empty() {
            return Err("schema has no columns".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.schema.len(), self.n_classes)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

impl Classifier for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, InferenceError> {
        let row = self.schema.encode(features)?;

        let mut votes = Array1::<f64>::zeros(self.n_classes);
        for (i, tree) in self.trees.iter().enumerate() {
            let leaf = tree
                .leaf(&row)
                .filter(|leaf| leaf.len() == self.n_classes)
                .ok_or_else(|| InferenceError::Backend(format!("tree {i} is malformed")))?;
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                votes.scaled_add(1.0 / total, &ArrayView1::from(leaf));
            }
        }

        argmax(votes.iter())
            .map(|idx| ClassIndex(idx as i64))
            .ok_or_else(|| InferenceError::Backend("ensemble produced no votes".to_string()))
    }

    fn name(&self) -> &'static str {
        "tree_ensemble"
    }

    fn class_count(&self) -> Option<usize> {
        Some(self.n_classes)
    }
}
