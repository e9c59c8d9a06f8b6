//! Merge classifier outputs and the color heuristic into one verdict.
//!
//! Branches are checked in a fixed order and the first one that fires
//! produces the result:
//!
//! 1. human present (overrides every wood signal)
//! 2. custom binary classifier, when configured
//! 3. generic classifier wood label, then the color heuristic
//! 4. rejection

use crate::classifier::ClassifierVerdict;
use crate::detection::heuristic::HeuristicReport;
use crate::detection::measurement;
use crate::models::{Classification, DetectedClass, DetectionMethod, PredictionResult, Region};

pub const HUMAN_TERMS: &[&str] = &[
    "person", "human", "man", "woman", "child", "people", "suit", "jersey", "sweatshirt", "face",
];

pub const WOOD_TERMS: &[&str] = &[
    "tree", "wood", "timber", "log", "bark", "trunk", "wooden", "lumber", "palm", "coconut",
    "plant", "outdoor", "forest", "plant stem", "stick", "branch", "potted plant", "flowerpot",
];

pub const HUMAN_MIN_SCORE: f32 = 0.30;
pub const CUSTOM_MIN_SCORE: f32 = 0.60;
pub const HEURISTIC_CONFIDENCE: u8 = 65;
pub const RAW_PREDICTION_COUNT: usize = 3;

pub const REJECTION_MESSAGE: &str =
    "No cocolumber detected. Only cocolumber/wood/logs/trees can be scanned.";

/// Everything the fusion chain looks at for one image
#[derive(Debug, Clone)]
pub struct FusionInputs<'a> {
    pub verdict: &'a ClassifierVerdict,
    /// `None` when no custom classifier is configured or it failed
    pub custom_score: Option<f32>,
    pub heuristic: HeuristicReport,
    pub region: Option<&'a Region>,
}

/// Score in [0, 1] to an integer percentage
pub fn to_confidence(score: f32) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

type Branch = fn(&FusionInputs<'_>) -> Option<PredictionResult>;

const CHAIN: [Branch; 3] = [human_branch, custom_model_branch, generic_branch];

/// Run the chain; exactly one result comes out
pub fn fuse(inputs: &FusionInputs<'_>) -> PredictionResult {
    CHAIN
        .iter()
        .find_map(|branch| branch(inputs))
        .unwrap_or_else(|| rejection(inputs))
}

fn raw_predictions(inputs: &FusionInputs<'_>) -> Vec<Classification> {
    inputs.verdict.top(RAW_PREDICTION_COUNT)
}

fn cocolumber(inputs: &FusionInputs<'_>, confidence: u8, method: DetectionMethod) -> PredictionResult {
    PredictionResult {
        detected_class: DetectedClass::Cocolumber,
        confidence,
        measurement: Some(measurement::estimate_or_default(inputs.region)),
        detection_method: method,
        raw_predictions: raw_predictions(inputs),
        message: None,
    }
}

pub fn human_branch(inputs: &FusionInputs<'_>) -> Option<PredictionResult> {
    let max_score = inputs.verdict.max_score();
    if !(inputs.verdict.any_label_contains(HUMAN_TERMS) && max_score > HUMAN_MIN_SCORE) {
        return None;
    }

    Some(PredictionResult {
        detected_class: DetectedClass::Human,
        confidence: to_confidence(max_score),
        measurement: None,
        detection_method: DetectionMethod::None,
        raw_predictions: raw_predictions(inputs),
        message: None,
    })
}

pub fn custom_model_branch(inputs: &FusionInputs<'_>) -> Option<PredictionResult> {
    let score = inputs.custom_score.filter(|score| *score > CUSTOM_MIN_SCORE)?;
    Some(cocolumber(inputs, to_confidence(score), DetectionMethod::CustomModel))
}

pub fn generic_branch(inputs: &FusionInputs<'_>) -> Option<PredictionResult> {
    if inputs.verdict.any_label_contains(WOOD_TERMS) {
        let confidence = to_confidence(inputs.verdict.max_score());
        return Some(cocolumber(inputs, confidence, DetectionMethod::Mobilenet));
    }

    if inputs.heuristic.looks_like_wood() {
        return Some(cocolumber(inputs, HEURISTIC_CONFIDENCE, DetectionMethod::HsvHeuristic));
    }

    None
}

pub fn rejection(inputs: &FusionInputs<'_>) -> PredictionResult {
    PredictionResult {
        detected_class: DetectedClass::NotCocolumber,
        confidence: 0,
        measurement: None,
        detection_method: DetectionMethod::None,
        raw_predictions: raw_predictions(inputs),
        message: Some(REJECTION_MESSAGE.to_string()),
    }
}
