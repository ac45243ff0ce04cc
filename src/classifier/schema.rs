use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::features::{FeatureValue, FeatureVector, FEATURE_COLUMNS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Training-time encoding for a text column; a value maps to its position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

/// Input columns a model artifact was trained on, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<ColumnSpec>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            columns: FEATURE_COLUMNS
                .iter()
                .map(|name| ColumnSpec {
                    name: name.to_string(),
                    categories: None,
                })
                .collect(),
        }
    }
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Turn `features` into the numeric row the model consumes.
    pub fn encode(&self, features: &FeatureVector) -> Result<Vec<f32>, InferenceError> {
        if features.len() != self.columns.len() {
            return Err(InferenceError::Shape {
                expected: self.columns.len(),
                actual: features.len(),
            });
        }

        features
            .iter()
            .zip(&self.columns)
            .enumerate()
            .map(|(position, (feature, column))| {
                if feature.name != column.name {
                    return Err(InferenceError::Column {
                        position,
                        expected: column.name.clone(),
                        actual: feature.name.to_string(),
                    });
                }
                encode_value(column, &feature.value)
            })
            .collect()
    }
}

fn encode_value(column: &ColumnSpec, value: &FeatureValue) -> Result<f32, InferenceError> {
    match (value, &column.categories) {
        (FeatureValue::Text(text), Some(categories)) => categories
            .iter()
            .position(|c| c == text)
            .map(|idx| idx as f32)
            .ok_or_else(|| InferenceError::UnknownCategory {
                column: column.name.clone(),
                value: text.clone(),
            }),
        (FeatureValue::Int(v), None) => Ok(*v as f32),
        (FeatureValue::Float(v), None) => Ok(*v as f32),
        (value, _) => Err(InferenceError::NonNumeric {
            column: column.name.clone(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build, Feature};
    use crate::models::ObesityRiskRequest;

    fn gender_schema() -> FeatureSchema {
        let mut schema = FeatureSchema::default();
        schema.columns[1].categories = Some(vec!["Female".to_string(), "Male".to_string()]);
        schema
    }

    fn features(gender: &str) -> FeatureVector {
        build(&ObesityRiskRequest {
            age: 25,
            selected_gender: gender.to_string(),
            veggies: 2,
            water_intake: 2,
            main_meals: 3,
            exercise: 1,
            technological_devices: 1,
            bmi: 22.5,
        })
    }

    #[test]
    fn test_shipped_schema_matches_builder() {
        let schema: FeatureSchema =
            serde_json::from_str(include_str!("../../artifacts/feature_schema.json")).unwrap();
        let names: Vec<_> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(schema, gender_schema());
    }

    #[test]
    fn test_encode_applies_categories() {
        let row = gender_schema().encode(&features("Male")).unwrap();
        assert_eq!(row, vec![25.0, 1.0, 2.0, 3.0, 2.0, 1.0, 1.0, 22.5]);

        let row = gender_schema().encode(&features("Female")).unwrap();
        assert_eq!(row[1], 0.0);
    }

    #[test]
    fn test_encode_is_case_sensitive() {
        let err = gender_schema().encode(&features("male")).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownCategory {
                column: "Gender".to_string(),
                value: "male".to_string(),
            }
        );
    }

    #[test]
    fn test_text_without_encoding_is_rejected() {
        let err = FeatureSchema::default().encode(&features("Male")).unwrap_err();
        assert!(matches!(err, InferenceError::NonNumeric { ref column, .. } if column == "Gender"));
    }

    #[test]
    fn test_numeric_on_categorical_column_is_rejected() {
        let mut schema = gender_schema();
        schema.columns[0].categories = Some(vec!["young".to_string()]);
        let err = schema.encode(&features("Male")).unwrap_err();
        assert!(matches!(err, InferenceError::NonNumeric { ref column, .. } if column == "Age"));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut schema = gender_schema();
        schema.columns.pop();
        let err = schema.encode(&features("Male")).unwrap_err();
        assert_eq!(err, InferenceError::Shape { expected: 7, actual: 8 });
    }

    #[test]
    fn test_column_order_mismatch() {
        let swapped: FeatureVector = features("Male")
            .iter()
            .cloned()
            .map(|f| match f.name.to_owned().as_str() {
                "NCP" => Feature { name: "CH2O", ..f },
                "CH2O" => Feature { name: "NCP", ..f },
                _ => f,
            })
            .collect::<Vec<_>>()
            .into();
        let err = gender_schema().encode(&swapped).unwrap_err();
        assert_eq!(
            err,
            InferenceError::Column {
                position: 3,
                expected: "NCP".to_string(),
                actual: "CH2O".to_string(),
            }
        );
    }
}
