//! Configuration shared by the `serve` and `scan` commands.
//!
//! CLI parsing lives in the binary; this module holds the parsed settings
//! and turns them into a ready [`ScanPipeline`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::classifier::{RtenBinaryClassifier, RtenClassifier};
use crate::detection::preprocessing::TensorLayout;
use crate::pipeline::ScanPipeline;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Model files to load at startup
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    /// Generic ImageNet classifier (`.rten`)
    pub generic_model: Option<PathBuf>,
    /// Labels for the generic classifier, one per line
    pub generic_labels: Option<PathBuf>,
    /// Custom binary wood-colored classifier (`.rten`)
    pub custom_model: Option<PathBuf>,
    pub input_layout: TensorLayout,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub models: ModelConfig,
}

impl ModelConfig {
    /// Load every configured classifier.
    ///
    /// A model that fails to load is logged and left out; the matching fusion
    /// branch is then skipped for every request.
    pub fn build_pipeline(&self) -> ScanPipeline {
        let mut pipeline = ScanPipeline::new();

        match (&self.generic_model, &self.generic_labels) {
            (Some(model), Some(labels)) => match RtenClassifier::load(model, labels, self.input_layout) {
                Ok(classifier) => {
                    info!("Loaded generic classifier from {}", model.display());
                    pipeline = pipeline.with_generic_classifier(Arc::new(classifier));
                }
                Err(e) => warn!("Generic classifier unavailable: {:#}", e),
            },
            (Some(_), None) => warn!("Generic classifier unavailable: no label file configured"),
            (None, _) => info!("No generic classifier configured"),
        }

        match &self.custom_model {
            Some(model) => match RtenBinaryClassifier::load(model, self.input_layout) {
                Ok(classifier) => {
                    info!("Loaded custom classifier from {}", model.display());
                    pipeline = pipeline.with_custom_classifier(Arc::new(classifier));
                }
                Err(e) => warn!("Custom classifier unavailable: {:#}", e),
            },
            None => info!("No custom classifier configured"),
        }

        pipeline
    }
}
