//! Obesity-risk prediction service.
//!
//! A pre-trained classifier and its label set are loaded once at startup and
//! served behind `POST /predict_obesity_risk/`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod predictor;
pub mod telemetry;

pub use classifier::{build_classifier, ClassIndex, Classifier, ClassifierConfig};
pub use error::{ArtifactLoadError, DecodeError, InferenceError, PredictError, ServiceError};
pub use features::{FeatureValue, FeatureVector, FEATURE_COLUMNS};
pub use labels::{build_label_decoder, LabelCodec, LabelDecoder};
pub use models::{ObesityRiskRequest, ObesityRiskResponse};
pub use predictor::RiskPredictor;

use crate::config::ArtifactSettings;

/// Load both artifacts and wire them into a predictor.
pub fn load_predictor(artifacts: &ArtifactSettings) -> Result<RiskPredictor, ArtifactLoadError> {
    let classifier = build_classifier(&artifacts.classifier)?;
    let labels = build_label_decoder(&artifacts.labels)?;
    Ok(RiskPredictor::new(classifier, labels))
}
