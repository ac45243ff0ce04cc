use serde::{de, Deserialize, Deserializer, Serialize};

/// Body of `POST /predict_obesity_risk/`. Every field is required.
///
/// Numeric fields also accept numeric strings; the mobile client sends `bmi`
/// as the output of `toFixed(2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObesityRiskRequest {
    #[serde(deserialize_with = "lenient_i64")]
    pub age: i64,
    pub selected_gender: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub veggies: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub water_intake: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub main_meals: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub exercise: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub technological_devices: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub bmi: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Integer, whole float (`3.0`) or integer string (`" 3 "`).
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(v) => Ok(v),
        NumberOrText::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Ok(v as i64)
        }
        NumberOrText::Float(v) => Err(de::Error::custom(format!("expected a whole number, got {v}"))),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got \"{s}\""))),
    }
}

/// Number or finite numeric string (`"22.53"`).
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(v) => Ok(v as f64),
        NumberOrText::Float(v) => Ok(v),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObesityRiskResponse {
    pub bmi: f64,
    pub obesity_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub classifier: String,
    pub categories: usize,
}
