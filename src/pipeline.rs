use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use image::GrayImage;
use log::{debug, info, warn};

use crate::classifier::{BinaryClassifier, Classifier, ClassifierVerdict};
use crate::detection::fusion::{self, FusionInputs, HUMAN_TERMS, WOOD_TERMS};
use crate::detection::heuristic;
use crate::detection::preprocessing::NormalizedImage;
use crate::detection::segmentation::{self, Segmentation};
use crate::error::ScanError;
use crate::models::PredictionResult;

/// Where intermediate images of a scan are written
#[derive(Clone, Debug)]
pub struct DebugConfig {
    pub output_dir: PathBuf,
}

impl DebugConfig {
    fn save(&self, name: &str, image: &GrayImage) -> Result<()> {
        let path = self.output_dir.join(name);
        image
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
        debug!("Debug: saved {}", name);
        Ok(())
    }

    fn save_scan(&self, image: &NormalizedImage, seg: &Segmentation, edges: &GrayImage) -> Result<()> {
        let input_path = self.output_dir.join("00_input.png");
        image
            .rgb()
            .save(&input_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        self.save("01_brown_mask.png", seg.raw_mask.as_gray())?;
        self.save("02_cleaned_mask.png", seg.cleaned_mask.as_gray())?;
        self.save("03_edges.png", edges)?;
        Ok(())
    }
}

/// One scan: classify, segment, apply the heuristic and fuse the signals.
///
/// Classifiers are loaded once and shared read-only; every other value lives
/// only for the duration of a call to [`ScanPipeline::scan`].
#[derive(Clone, Default)]
pub struct ScanPipeline {
    generic: Option<Arc<dyn Classifier>>,
    custom: Option<Arc<dyn BinaryClassifier>>,
    debug: Option<DebugConfig>,
}

impl ScanPipeline {
    /// Pipeline with no classifiers; only the color heuristic can fire
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generic_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.generic = Some(classifier);
        self
    }

    pub fn with_custom_classifier(mut self, classifier: Arc<dyn BinaryClassifier>) -> Self {
        self.custom = Some(classifier);
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn has_generic_classifier(&self) -> bool {
        self.generic.is_some()
    }

    pub fn has_custom_classifier(&self) -> bool {
        self.custom.is_some()
    }

    /// Generic verdict, or an empty one when the classifier is missing or fails
    fn generic_verdict(&self, image: &NormalizedImage) -> ClassifierVerdict {
        let Some(classifier) = &self.generic else {
            return ClassifierVerdict::empty();
        };

        match classifier.classify(image) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Classifier {} unavailable: {:#}", classifier.name(), e);
                ClassifierVerdict::empty()
            }
        }
    }

    fn custom_score(&self, image: &NormalizedImage) -> Option<f32> {
        let classifier = self.custom.as_ref()?;

        match classifier.score(image) {
            Ok(score) if score.is_finite() => Some(score.clamp(0.0, 1.0)),
            Ok(score) => {
                warn!("Classifier {} returned non-finite score {}", classifier.name(), score);
                None
            }
            Err(e) => {
                warn!("Classifier {} unavailable: {:#}", classifier.name(), e);
                None
            }
        }
    }

    /// Run one scan over an already normalized image
    pub fn scan(&self, image: &NormalizedImage) -> Result<PredictionResult, ScanError> {
        let verdict = self.generic_verdict(image);
        let custom_score = self.custom_score(image);

        let seg = segmentation::segment(image.rgb());
        let edges = heuristic::edge_map(&image.to_grayscale());
        let report = heuristic::evaluate(&seg.raw_mask, &edges);

        if let Some(debug_config) = &self.debug {
            debug_config.save_scan(image, &seg, &edges)?;
        }

        let labels: Vec<&str> = verdict.entries().iter().take(3).map(|c| c.label.as_str()).collect();
        let scores: Vec<f32> = verdict.entries().iter().take(3).map(|c| c.score).collect();
        debug!("Top predictions: {:?}", labels);
        debug!("Confidence scores: {:?}", scores);
        debug!("Human detected: {}", verdict.any_label_contains(HUMAN_TERMS));
        debug!("Wood detected: {}", verdict.any_label_contains(WOOD_TERMS));
        debug!("Custom model score: {:?}", custom_score);
        debug!(
            "Wood-like heuristic: {} (brown {:.3}, edges {:.3})",
            report.looks_like_wood(),
            report.brown_ratio,
            report.edge_ratio
        );
        match &seg.region {
            Some(region) => debug!(
                "Largest region: {}x{} at ({}, {}), area {:.0} px, fill {:.2}",
                region.width(),
                region.height(),
                region.x(),
                region.y(),
                region.area(),
                region.fill_ratio()
            ),
            None => debug!("No wood-colored region found"),
        }

        let result = fusion::fuse(&FusionInputs {
            verdict: &verdict,
            custom_score,
            heuristic: report,
            region: seg.region.as_ref(),
        });

        info!(
            "Scan result: {:?} ({}%) via {:?}",
            result.detected_class, result.confidence, result.detection_method
        );

        Ok(result)
    }

    /// Decode a base64 payload and scan it
    pub fn scan_base64(&self, payload: &str) -> Result<PredictionResult, ScanError> {
        let image = NormalizedImage::from_base64(payload)?;
        self.scan(&image)
    }

    /// Read an image file from disk and scan it
    pub fn scan_file(&self, path: &Path) -> Result<PredictionResult, ScanError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ScanError::invalid_input(format!("Failed to read {}: {}", path.display(), e)))?;
        let image = NormalizedImage::from_bytes(&bytes)?;
        self.scan(&image)
    }
}
