//! Opaque classifiers: a feature vector in, a class index out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ArtifactLoadError, InferenceError};
use crate::features::FeatureVector;

pub mod onnx;
pub mod schema;
pub mod tree;

pub use onnx::OnnxClassifier;
pub use schema::{ColumnSpec, FeatureSchema};
pub use tree::TreeEnsemble;

/// Position of a category in the label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassIndex(pub i64);

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Classifier: Send + Sync {
    /// Deterministic: the same vector always yields the same index.
    fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, InferenceError>;

    fn name(&self) -> &'static str;

    /// Number of classes the model can emit, when the artifact says so.
    fn class_count(&self) -> Option<usize> {
        None
    }
}

/// Which artifact format holds the classifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// JSON export of a decision tree or random forest.
    Tree { path: PathBuf },
    /// ONNX graph, with an optional JSON sidecar describing its input columns.
    Onnx {
        path: PathBuf,
        #[serde(default)]
        schema: Option<PathBuf>,
    },
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::Tree {
            path: PathBuf::from("artifacts/obesity_risk_model.json"),
        }
    }
}

pub fn build_classifier(cfg: &ClassifierConfig) -> Result<Arc<dyn Classifier>, ArtifactLoadError> {
    match cfg {
        ClassifierConfig::Tree { path } => {
            let clf = TreeEnsemble::load(path)?;
            Ok(Arc::new(clf) as Arc<dyn Classifier>)
        }
        ClassifierConfig::Onnx { path, schema } => {
            let schema = match schema {
                Some(p) => load_schema(p)?,
                None => FeatureSchema::default(),
            };
            let clf = OnnxClassifier::load(path, schema)?;
            Ok(Arc::new(clf) as Arc<dyn Classifier>)
        }
    }
}

fn load_schema(path: &Path) -> Result<FeatureSchema, ArtifactLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schema: FeatureSchema = serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if schema.is_empty() {
        return Err(ArtifactLoadError::invalid(path, "schema has no columns"));
    }
    Ok(schema)
}

/// Index of the largest score; the first one wins on ties.
pub(crate) fn argmax<'a, T>(scores: impl IntoIterator<Item = &'a T>) -> Option<usize>
where
    T: PartialOrd + 'a,
{
    let mut best: Option<(usize, &T)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}
