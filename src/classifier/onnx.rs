use std::path::Path;

use tract_core::ndarray::Array2;
use tract_onnx::prelude::*;

use super::{argmax, ClassIndex, Classifier, FeatureSchema};
use crate::error::{ArtifactLoadError, InferenceError};
use crate::features::FeatureVector;

type RunnableOnnx = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier executed with tract.
///
/// The graph takes a single `[1, n]` f32 row. Exporters that emit a label
/// tensor first (`i64`) are read directly; otherwise the first output is
/// treated as per-class scores. Probability outputs wrapped in a ZipMap are
/// not supported; export with `zipmap=False`.
pub struct OnnxClassifier {
    model: RunnableOnnx,
    schema: FeatureSchema,
}

impl OnnxClassifier {
    pub fn load(path: &Path, schema: FeatureSchema) -> Result<Self, ArtifactLoadError> {
        std::fs::metadata(path).map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let onnx_err = |e: TractError| ArtifactLoadError::Onnx {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(onnx_err)?
            .with_input_fact(0, f32::fact([1, schema.len()]).into())
            .map_err(onnx_err)?
            .into_optimized()
            .map_err(onnx_err)?
            .into_runnable()
            .map_err(onnx_err)?;

        tracing::debug!(path = %path.display(), columns = schema.len(), "loaded ONNX model");
        Ok(Self { model, schema })
    }
}

fn backend(e: TractError) -> InferenceError {
    InferenceError::Backend(format!("{e:#}"))
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, InferenceError> {
        let row = self.schema.encode(features)?;
        let input = Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| InferenceError::Backend(e.to_string()))?
            .into_tensor();

        let outputs = self.model.run(tvec!(input.into())).map_err(backend)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::Backend("model produced no outputs".to_string()))?;

        let index = if first.datum_type() == i64::datum_type() {
            first.as_slice::<i64>().map_err(backend)?.first().copied()
        } else {
            let scores = first.cast_to::<f32>().map_err(backend)?;
            let view = scores.to_array_view::<f32>().map_err(backend)?;
            argmax(view.iter()).map(|idx| idx as i64)
        };

        index
            .map(ClassIndex)
            .ok_or_else(|| InferenceError::Backend("model output is empty".to_string()))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_io_error() {
        let err = OnnxClassifier::load(Path::new("/nonexistent/model.onnx"), FeatureSchema::default())
            .err()
            .unwrap();
        assert!(matches!(err, ArtifactLoadError::Io { .. }));
    }

    #[test]
    fn test_garbage_model_is_onnx_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();

        let err = OnnxClassifier::load(&path, FeatureSchema::default()).err().unwrap();
        assert!(matches!(err, ArtifactLoadError::Onnx { .. }));
    }
}
