//! JSON request and response bodies of the HTTP service.
//!
//! Measurement values are rendered as strings, matching what existing
//! clients of the scanner already parse.

use serde::{Deserialize, Serialize};

use crate::models::{DetectedClass, DetectionMethod, PredictionResult};

pub const SERVICE_NAME: &str = "Cocolumber Detection Service";

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPrediction {
    pub class: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub detected_class: DetectedClass,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_lumber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    pub detection_method: DetectionMethod,
    pub raw_predictions: Vec<RawPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        let m = result.measurement.as_ref();
        Self {
            detected_class: result.detected_class,
            confidence: result.confidence,
            height: m.map(|m| format!("{:.1}", m.height_m)),
            width: m.map(|m| m.width_cm.to_string()),
            diameter: m.map(|m| m.diameter_cm().to_string()),
            estimated_lumber: m.map(|m| m.board_feet.to_string()),
            volume: m.map(|m| format!("{:.3}", m.volume_cubic_m)),
            quality: m.map(|m| m.quality.as_str().to_string()),
            quality_score: m.map(|m| m.quality_score()),
            detection_method: result.detection_method,
            raw_predictions: result
                .raw_predictions
                .iter()
                .map(|c| RawPrediction {
                    class: c.label.clone(),
                    confidence: c.score,
                })
                .collect(),
            error: result.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    #[serde(rename = "genericModel")]
    pub generic_model: bool,
    #[serde(rename = "customModel")]
    pub custom_model: bool,
}
