use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::PredictError;
use crate::features;
use crate::labels::LabelDecoder;
use crate::models::{ObesityRiskRequest, ObesityRiskResponse};

/// Request → category pipeline over a loaded classifier and label set.
///
/// Both collaborators are read-only after startup, so one instance is shared
/// by every worker.
#[derive(Clone)]
pub struct RiskPredictor {
    classifier: Arc<dyn Classifier>,
    labels: Arc<dyn LabelDecoder>,
}

impl RiskPredictor {
    pub fn new(classifier: Arc<dyn Classifier>, labels: Arc<dyn LabelDecoder>) -> Self {
        if let Some(classes) = classifier.class_count() {
            if classes != labels.len() {
                tracing::warn!(
                    classifier_classes = classes,
                    labels = labels.len(),
                    "classifier and label set disagree on the number of categories"
                );
            }
        }
        Self { classifier, labels }
    }

    pub fn handle(&self, request: &ObesityRiskRequest) -> Result<ObesityRiskResponse, PredictError> {
        let features = features::build(request);
        tracing::debug!(?features, "built feature vector");

        let index = self.classifier.predict(&features)?;
        let obesity_level = self.labels.decode(index)?.to_string();

        Ok(ObesityRiskResponse {
            bmi: request.bmi,
            obesity_level,
        })
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn category_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassIndex;
    use crate::error::{DecodeError, InferenceError};
    use crate::features::FeatureVector;
    use crate::labels::LabelCodec;

    /// Returns a fixed index.
    struct Fixed(i64);

    impl Classifier for Fixed {
        fn predict(&self, _: &FeatureVector) -> Result<ClassIndex, InferenceError> {
            Ok(ClassIndex(self.0))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, InferenceError> {
            Err(InferenceError::Shape {
                expected: 9,
                actual: features.len(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn labels() -> Arc<dyn LabelDecoder> {
        Arc::new(LabelCodec::new(vec!["Normal_Weight".into(), "Obesity_Type_I".into()]).unwrap())
    }

    fn request() -> ObesityRiskRequest {
        ObesityRiskRequest {
            age: 25,
            selected_gender: "Male".to_string(),
            veggies: 2,
            water_intake: 2,
            main_meals: 3,
            exercise: 1,
            technological_devices: 1,
            bmi: 22.5,
        }
    }

    #[test]
    fn test_handle_echoes_bmi_and_decodes() {
        let predictor = RiskPredictor::new(Arc::new(Fixed(1)), labels());
        let mut req = request();
        req.bmi = 0.1 + 0.2;

        let resp = predictor.handle(&req).unwrap();
        assert_eq!(resp.bmi.to_bits(), req.bmi.to_bits());
        assert_eq!(resp.obesity_level, "Obesity_Type_I");
    }

    #[test]
    fn test_inference_error_propagates() {
        let predictor = RiskPredictor::new(Arc::new(Failing), labels());
        let err = predictor.handle(&request()).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Inference(InferenceError::Shape { expected: 9, actual: 8 })
        ));
    }

    #[test]
    fn test_decode_error_propagates() {
        let predictor = RiskPredictor::new(Arc::new(Fixed(5)), labels());
        let err = predictor.handle(&request()).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Decode(DecodeError {
                index: ClassIndex(5),
                len: 2
            })
        ));
    }

    #[test]
    fn test_reports_collaborators() {
        let predictor = RiskPredictor::new(Arc::new(Fixed(0)), labels());
        assert_eq!(predictor.classifier_name(), "fixed");
        assert_eq!(predictor.category_count(), 2);
    }
}
