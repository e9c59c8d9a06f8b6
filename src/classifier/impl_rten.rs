use std::path::Path;

use anyhow::Context;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;

use crate::classifier::interface::{BinaryClassifier, Classifier, ClassifierVerdict, MAX_VERDICT_LEN};
use crate::detection::preprocessing::{Normalization, NormalizedImage, TensorLayout};
use crate::models::Classification;

/// Run a model on one image and flatten its first output
fn run_model(
    model: &Model,
    image: &NormalizedImage,
    layout: TensorLayout,
    normalization: Normalization,
) -> anyhow::Result<Vec<f32>> {
    let input = image.to_tensor(layout, normalization);

    let output: NdTensor<f32, 2> = model
        .run_one(input.view().into(), None)
        .map_err(|e| anyhow::anyhow!("Failed to run inference: {}", e))?
        .try_into()
        .map_err(|e| anyhow::anyhow!("Unexpected model output: {:?}", e))?;

    Ok(output.iter().copied().collect())
}

/// Convert logits to probabilities unless the model already emits them
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let already_probabilities = scores.iter().all(|s| (0.0..=1.0).contains(s)) && (sum - 1.0).abs() < 1e-3;
    if already_probabilities || scores.is_empty() {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// ImageNet-style classifier (e.g. MobileNetV2) converted to the rten format
pub struct RtenClassifier {
    model: Model,
    labels: Vec<String>,
    layout: TensorLayout,
}

impl RtenClassifier {
    /// Load the model and a label file with one class name per line
    pub fn load(model_path: &Path, labels_path: &Path, layout: TensorLayout) -> anyhow::Result<Self> {
        let model = Model::load_file(model_path)
            .with_context(|| format!("Failed to load model {}", model_path.display()))?;
        let labels = std::fs::read_to_string(labels_path)
            .with_context(|| format!("Failed to read labels {}", labels_path.display()))?;
        let labels = parse_labels(&labels);

        if labels.is_empty() {
            anyhow::bail!("Label file is empty: {}", labels_path.display());
        }

        Ok(Self {
            model,
            labels,
            layout,
        })
    }
}

/// One label per line; leading `index:`, `index ` and ImageNet synset (`n01440764 `) prefixes are dropped
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut label = line;
            while let Some((prefix, rest)) = label.split_once(|c: char| c == ':' || c.is_whitespace()) {
                let rest = rest.trim();
                if rest.is_empty() || !(is_class_index(prefix) || is_synset_id(prefix)) {
                    break;
                }
                label = rest;
            }
            label.to_string()
        })
        .collect()
}

fn is_class_index(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_synset_id(token: &str) -> bool {
    token.len() == 9 && token.starts_with('n') && token[1..].chars().all(|c| c.is_ascii_digit())
}

/// Pair probabilities with labels, best first, at most `MAX_VERDICT_LEN` entries
///
/// When the model has more outputs than there are labels, the extra leading
/// outputs (the background class of 1001-way exports) are skipped.
pub fn rank_predictions(probabilities: &[f32], labels: &[String]) -> Vec<Classification> {
    let offset = probabilities.len().saturating_sub(labels.len());

    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().skip(offset).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(MAX_VERDICT_LEN);

    ranked
        .into_iter()
        .filter_map(|(idx, score)| {
            labels
                .get(idx - offset)
                .map(|label| Classification::new(label.clone(), score))
        })
        .collect()
}

/// Probability from a single binary output, which may be a logit
pub fn binary_score(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) { raw } else { sigmoid(raw) }
}

impl Classifier for RtenClassifier {
    fn classify(&self, image: &NormalizedImage) -> anyhow::Result<ClassifierVerdict> {
        let scores = run_model(&self.model, image, self.layout, Normalization::MobileNet)?;
        let probabilities = to_probabilities(&scores);
        let entries = rank_predictions(&probabilities, &self.labels);

        Ok(ClassifierVerdict::new(entries))
    }

    fn name(&self) -> &str {
        "mobilenet"
    }
}

/// Custom wood-colored vs. not binary classifier
pub struct RtenBinaryClassifier {
    model: Model,
    layout: TensorLayout,
}

impl RtenBinaryClassifier {
    pub fn load(model_path: &Path, layout: TensorLayout) -> anyhow::Result<Self> {
        let model = Model::load_file(model_path)
            .with_context(|| format!("Failed to load model {}", model_path.display()))?;
        Ok(Self { model, layout })
    }
}

impl BinaryClassifier for RtenBinaryClassifier {
    fn score(&self, image: &NormalizedImage) -> anyhow::Result<f32> {
        let outputs = run_model(&self.model, image, self.layout, Normalization::Unit)?;
        let raw = *outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("Binary classifier produced no output"))?;

        Ok(binary_score(raw))
    }

    fn name(&self) -> &str {
        "custom_model"
    }
}
