use std::path::PathBuf;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::classifier::ClassIndex;
use crate::models::ErrorResponse;

/// Failure to read one of the persisted artifacts at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to load ONNX model {}: {reason}", path.display())]
    Onnx { path: PathBuf, reason: String },
}

impl ArtifactLoadError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The feature vector does not fit the schema the classifier was trained on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    Shape { expected: usize, actual: usize },

    #[error("feature at position {position} is `{actual}`, model expects `{expected}`")]
    Column {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("feature `{column}` has a value of the wrong type: {value}")]
    NonNumeric { column: String, value: String },

    #[error("feature `{column}` has unknown category `{value}`")]
    UnknownCategory { column: String, value: String },

    #[error("model execution failed: {0}")]
    Backend(String),
}

/// Class index outside the loaded label set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("class index {index} outside label range 0..{len}")]
pub struct DecodeError {
    pub index: ClassIndex,
    pub len: usize,
}

/// Anything that can go wrong after the request has been accepted.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors surfaced over HTTP.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Payload failed structural validation. Caller error.
    #[error("{message}")]
    Validation { kind: &'static str, message: String, status: StatusCode },

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Validation { kind, .. } => *kind,
            Self::Predict(PredictError::Inference(_)) => "inference_error",
            Self::Predict(PredictError::Decode(_)) => "decode_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { status, .. } => *status,
            Self::Predict(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
