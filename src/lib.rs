pub mod classifier;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod wire;

pub use classifier::{BinaryClassifier, Classifier, ClassifierVerdict};
pub use error::ScanError;
pub use models::{
    Classification, DetectedClass, DetectionMethod, Measurement, PredictionResult, QualityGrade, Region,
};
pub use pipeline::{DebugConfig, ScanPipeline};
