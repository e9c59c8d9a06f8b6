//! Pixel geometry to physical log dimensions.
//!
//! There is no depth sensor and no calibration target, so the scale factors
//! are fixed constants and the results are clamped to the range a coconut
//! log can plausibly have.

use std::f64::consts::PI;

use crate::models::{Measurement, QualityGrade, Region};

pub const METERS_PER_PIXEL: f64 = 0.02;
pub const CENTIMETERS_PER_PIXEL: u32 = 2;

pub const MIN_HEIGHT_M: f64 = 3.0;
pub const MAX_HEIGHT_M: f64 = 20.0;
pub const MIN_WIDTH_CM: u32 = 15;
pub const MAX_WIDTH_CM: u32 = 100;

pub const BOARD_FEET_PER_CUBIC_METER: f64 = 424.0;
pub const MIN_BOARD_FEET: u32 = 40;

pub const DEFAULT_HEIGHT_M: f64 = 10.5;
pub const DEFAULT_WIDTH_CM: u32 = 42;
pub const DEFAULT_BOARD_FEET: u32 = 95;

/// Fill-ratio breakpoints, strictly greater than
const GRADE_BREAKPOINTS: [(f64, QualityGrade); 3] = [
    (0.75, QualityGrade::Premium),
    (0.60, QualityGrade::GradeA),
    (0.45, QualityGrade::GradeB),
];

/// Map fill ratio to a grade; anything at or below the last breakpoint is Grade C
pub fn grade_for_fill_ratio(fill_ratio: f64) -> QualityGrade {
    GRADE_BREAKPOINTS
        .iter()
        .find(|(threshold, _)| fill_ratio > *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(QualityGrade::GradeC)
}

/// Volume of a uniform cylinder (Smalian's approximation for a log)
pub fn log_volume(diameter_cm: u32, height_m: f64) -> f64 {
    let diameter_m = diameter_cm as f64 / 100.0;
    (diameter_m * diameter_m / 4.0) * PI * height_m
}

pub fn board_feet(volume_cubic_m: f64) -> u32 {
    let raw = (volume_cubic_m * BOARD_FEET_PER_CUBIC_METER).max(0.0) as u32;
    raw.max(MIN_BOARD_FEET)
}

/// Estimate log dimensions from the dominant region
pub fn estimate(region: &Region) -> Measurement {
    let height_m = (region.height() as f64 * METERS_PER_PIXEL).clamp(MIN_HEIGHT_M, MAX_HEIGHT_M);
    let width_cm = region
        .width()
        .saturating_mul(CENTIMETERS_PER_PIXEL)
        .clamp(MIN_WIDTH_CM, MAX_WIDTH_CM);

    let volume_cubic_m = log_volume(width_cm, height_m);
    let fill_ratio = region.fill_ratio();

    Measurement {
        height_m,
        width_cm,
        volume_cubic_m,
        board_feet: board_feet(volume_cubic_m),
        quality: grade_for_fill_ratio(fill_ratio),
        fill_ratio,
    }
}

/// Typical-log values reported when segmentation finds nothing
pub fn default_measurement() -> Measurement {
    Measurement {
        height_m: DEFAULT_HEIGHT_M,
        width_cm: DEFAULT_WIDTH_CM,
        volume_cubic_m: DEFAULT_BOARD_FEET as f64 / BOARD_FEET_PER_CUBIC_METER,
        board_feet: DEFAULT_BOARD_FEET,
        quality: QualityGrade::GradeA,
        fill_ratio: 0.0,
    }
}

/// Estimate from a region, falling back to the defaults when there is none
pub fn estimate_or_default(region: Option<&Region>) -> Measurement {
    match region {
        Some(region) => estimate(region),
        None => default_measurement(),
    }
}
