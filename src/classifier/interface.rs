use crate::detection::preprocessing::NormalizedImage;
use crate::models::Classification;

/// Most entries a verdict keeps
pub const MAX_VERDICT_LEN: usize = 10;

/// Top-scoring labels from a multi-class classifier, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierVerdict {
    entries: Vec<Classification>,
}

impl ClassifierVerdict {
    /// Sort descending by score, clamp scores to [0, 1] and keep the top ten
    pub fn new(mut entries: Vec<Classification>) -> Self {
        for entry in &mut entries {
            entry.score = if entry.score.is_nan() { 0.0 } else { entry.score.clamp(0.0, 1.0) };
        }
        // Stable sort keeps model order among equal scores
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(MAX_VERDICT_LEN);
        Self { entries }
    }

    /// Verdict used when the generic classifier is unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Classification] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, n: usize) -> Vec<Classification> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Highest score in the verdict, 0 when empty
    pub fn max_score(&self) -> f32 {
        self.entries.iter().map(|c| c.score).fold(0.0, f32::max)
    }

    /// Whether any label contains any of the given lowercase terms
    pub fn any_label_contains(&self, terms: &[&str]) -> bool {
        self.entries.iter().any(|entry| {
            let label = entry.label.to_lowercase();
            terms.iter().any(|term| label.contains(term))
        })
    }
}

/// Generic multi-class image classifier
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &NormalizedImage) -> anyhow::Result<ClassifierVerdict>;

    fn name(&self) -> &str;
}

/// Binary classifier returning the probability that the image is wood-colored
pub trait BinaryClassifier: Send + Sync {
    fn score(&self, image: &NormalizedImage) -> anyhow::Result<f32>;

    fn name(&self) -> &str;
}
