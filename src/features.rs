//! Request → feature vector reassembly.
//!
//! The classifier consumes features by position, so the column order below
//! must match the order the model was trained on. Values are passed through
//! untouched: no scaling, clamping or categorical encoding happens here.

use std::fmt;

use crate::models::ObesityRiskRequest;

/// Column names in the order the classifier expects them.
pub const FEATURE_COLUMNS: [&str; 8] = ["Age", "Gender", "FCVC", "NCP", "CH2O", "FAF", "TUE", "BMI"];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: &'static str,
    pub value: FeatureValue,
}

/// Ordered, named feature values for a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<Feature>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|f| f.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

impl From<Vec<Feature>> for FeatureVector {
    fn from(features: Vec<Feature>) -> Self {
        Self(features)
    }
}

/// Build the feature vector for `request`.
///
/// Note that NCP (main meals) precedes CH2O (water intake) even though the
/// request lists water intake first.
pub fn build(request: &ObesityRiskRequest) -> FeatureVector {
    let values = [
        FeatureValue::Int(request.age),
        FeatureValue::Text(request.selected_gender.clone()),
        FeatureValue::Int(request.veggies),
        FeatureValue::Int(request.main_meals),
        FeatureValue::Int(request.water_intake),
        FeatureValue::Int(request.exercise),
        FeatureValue::Int(request.technological_devices),
        FeatureValue::Float(request.bmi),
    ];

    FEATURE_COLUMNS
        .iter()
        .zip(values)
        .map(|(&name, value)| Feature { name, value })
        .collect::<Vec<_>>()
        .into()
}
