//! Integration tests for the full scan pipeline.
//!
//! Tests cover:
//! - Each fusion branch reached from real pixels
//! - Recovery from unavailable classifiers
//! - Payload decoding and input errors
//! - Debug output and idempotence

mod common;

use std::sync::Arc;

use cocoscan::detection::measurement::default_measurement;
use cocoscan::wire::PredictionResponse;
use common::*;
use image::{DynamicImage, RgbImage};

#[test]
fn test_heuristic_only_pipeline_detects_planks() -> anyhow::Result<()> {
    // 1. No classifiers configured at all
    let pipeline = ScanPipeline::new();

    // 2. Brown and white plank stripes are brown enough and edgy enough
    let result = pipeline.scan(&normalized(plank_stack(8)))?;

    assert_eq!(result.detected_class, DetectedClass::Cocolumber);
    assert_eq!(result.detection_method, DetectionMethod::HsvHeuristic);
    assert_eq!(result.confidence, 65);
    let m = result.measurement.expect("Cocolumber should be measured");
    assert_eq!(m.width_cm, 100);
    assert_eq!(m.height_m, 3.0);

    Ok(())
}

#[test]
fn test_uniform_brown_is_rejected_by_heuristic() -> anyhow::Result<()> {
    // Plenty of brown but no structural edges
    let result = ScanPipeline::new().scan(&normalized(solid(WOOD_BROWN)))?;
    assert_eq!(result.detected_class, DetectedClass::NotCocolumber);
    assert_eq!(result.confidence, 0);
    assert!(result.message.is_some());
    Ok(())
}

#[test]
fn test_green_scene_is_rejected() -> anyhow::Result<()> {
    let pipeline = ScanPipeline::new().with_generic_classifier(Arc::new(FakeClassifier::new(&[
        ("lawn mower", 0.6),
        ("golf ball", 0.1),
    ])));

    let result = pipeline.scan(&normalized(solid(LEAF_GREEN)))?;
    assert_eq!(result.detected_class, DetectedClass::NotCocolumber);
    assert!(result.measurement.is_none());
    assert_eq!(result.raw_predictions.len(), 2);
    Ok(())
}

#[test]
fn test_person_near_logs_is_not_measured() -> anyhow::Result<()> {
    let pipeline = ScanPipeline::new()
        .with_generic_classifier(Arc::new(FakeClassifier::new(&[("person", 0.5), ("log", 0.1)])))
        .with_custom_classifier(Arc::new(FakeBinaryClassifier::new(0.95)));

    let result = pipeline.scan(&normalized(plank_stack(8)))?;
    assert_eq!(result.detected_class, DetectedClass::Human);
    assert_eq!(result.confidence, 50);
    assert!(result.measurement.is_none());
    Ok(())
}

#[test]
fn test_custom_model_without_region_uses_defaults() -> anyhow::Result<()> {
    let pipeline = ScanPipeline::new().with_custom_classifier(Arc::new(FakeBinaryClassifier::new(0.82)));

    let result = pipeline.scan(&normalized(solid(SKY_BLUE)))?;
    assert_eq!(result.detected_class, DetectedClass::Cocolumber);
    assert_eq!(result.detection_method, DetectionMethod::CustomModel);
    assert_eq!(result.confidence, 82);
    assert_eq!(result.measurement, Some(default_measurement()));
    Ok(())
}

#[test]
fn test_generic_label_measures_largest_region() -> anyhow::Result<()> {
    let pipeline =
        ScanPipeline::new().with_generic_classifier(Arc::new(FakeClassifier::new(&[("log", 0.7)])));

    let result = pipeline.scan(&normalized(rect_on(WHITE, WOOD_BROWN, 90, 20, 40, 180)))?;
    assert_eq!(result.detection_method, DetectionMethod::Mobilenet);
    assert_eq!(result.confidence, 70);

    let m = result.measurement.expect("Cocolumber should be measured");
    assert_eq!(m.width_cm, 80);
    assert!((m.height_m - 3.6).abs() < 1e-9);
    assert_eq!(m.quality, QualityGrade::Premium);
    Ok(())
}

#[test]
fn test_failing_classifiers_are_skipped() -> anyhow::Result<()> {
    // 1. Both classifiers error on every call
    let pipeline = ScanPipeline::new()
        .with_generic_classifier(Arc::new(FailingClassifier))
        .with_custom_classifier(Arc::new(FailingClassifier));

    // 2. The scan still succeeds on the heuristic alone
    let result = pipeline.scan(&normalized(plank_stack(8)))?;
    assert_eq!(result.detection_method, DetectionMethod::HsvHeuristic);
    assert!(result.raw_predictions.is_empty());
    Ok(())
}

#[test]
fn test_base64_payloads() -> anyhow::Result<()> {
    let pipeline = ScanPipeline::new();
    let img = plank_stack(8);

    let plain = pipeline.scan_base64(&base64_png(&img))?;
    let data_url = pipeline.scan_base64(&data_url_png(&img))?;
    assert_eq!(plain, data_url);
    Ok(())
}

#[test]
fn test_invalid_payloads_are_input_errors() {
    let pipeline = ScanPipeline::new();

    for payload in ["", "data:image/png;base64,", "not base64 at all!", "aGVsbG8gd29ybGQ="] {
        let err = pipeline.scan_base64(payload).expect_err("Payload should be rejected");
        assert!(matches!(err, ScanError::InvalidInput(_)), "{:?} gave {:?}", payload, err);
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn test_large_images_are_resized() {
    let big = RgbImage::from_pixel(640, 480, WOOD_BROWN);
    let image = cocoscan::detection::NormalizedImage::from_image(&DynamicImage::ImageRgb8(big));
    assert_eq!(image.dimensions(), (SIZE, SIZE));
}

#[test]
fn test_identical_input_gives_identical_output() -> anyhow::Result<()> {
    let pipeline = ScanPipeline::new()
        .with_generic_classifier(Arc::new(FakeClassifier::new(&[("palm", 0.4), ("fence", 0.3)])));
    let payload = base64_png(&rect_on(WHITE, DARK_BROWN, 30, 30, 120, 150));

    let first = serde_json::to_vec(&PredictionResponse::from(&pipeline.scan_base64(&payload)?))?;
    let second = serde_json::to_vec(&PredictionResponse::from(&pipeline.scan_base64(&payload)?))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_debug_output() -> anyhow::Result<()> {
    // 1. Debug into a fresh directory
    let dir = tempfile::TempDir::new()?;
    let out = dir.path().join("debug");
    let pipeline = ScanPipeline::new().with_debug(out.clone())?;
    pipeline.scan(&normalized(plank_stack(8)))?;

    // 2. Every intermediate image is written
    for name in ["00_input.png", "01_brown_mask.png", "02_cleaned_mask.png", "03_edges.png"] {
        assert!(out.join(name).exists(), "missing {}", name);
    }

    // 3. A non-empty directory is refused
    assert!(ScanPipeline::new().with_debug(out).is_err());
    Ok(())
}
