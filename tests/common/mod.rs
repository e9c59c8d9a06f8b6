#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cocoscan for tests
pub use cocoscan::classifier::{FailingClassifier, FakeBinaryClassifier, FakeClassifier};
pub use cocoscan::{
    Classification, ClassifierVerdict, DetectedClass, DetectionMethod, Measurement, PredictionResult,
    QualityGrade, Region, ScanError, ScanPipeline,
};
