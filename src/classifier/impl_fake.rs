use crate::classifier::interface::{BinaryClassifier, Classifier, ClassifierVerdict};
use crate::detection::preprocessing::NormalizedImage;
use crate::models::Classification;

/// Classifier that returns a fixed verdict regardless of the image
pub struct FakeClassifier {
    verdict: ClassifierVerdict,
}

impl FakeClassifier {
    pub fn new(entries: &[(&str, f32)]) -> Self {
        let entries = entries
            .iter()
            .map(|(label, score)| Classification::new(*label, *score))
            .collect();
        Self {
            verdict: ClassifierVerdict::new(entries),
        }
    }
}

impl Classifier for FakeClassifier {
    fn classify(&self, _image: &NormalizedImage) -> anyhow::Result<ClassifierVerdict> {
        Ok(self.verdict.clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Binary classifier that returns a fixed score
pub struct FakeBinaryClassifier {
    score: f32,
}

impl FakeBinaryClassifier {
    pub fn new(score: f32) -> Self {
        Self { score }
    }
}

impl BinaryClassifier for FakeBinaryClassifier {
    fn score(&self, _image: &NormalizedImage) -> anyhow::Result<f32> {
        Ok(self.score)
    }

    fn name(&self) -> &str {
        "fake_binary"
    }
}

/// Classifier whose every call fails, standing in for a broken model
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _image: &NormalizedImage) -> anyhow::Result<ClassifierVerdict> {
        anyhow::bail!("classifier unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

impl BinaryClassifier for FailingClassifier {
    fn score(&self, _image: &NormalizedImage) -> anyhow::Result<f32> {
        anyhow::bail!("classifier unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}
