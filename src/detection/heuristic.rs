use image::GrayImage;

use crate::detection::preprocessing::detect_edges;
use crate::detection::segmentation::ColorMask;

pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;
pub const MIN_BROWN_RATIO: f64 = 0.15;
pub const MIN_EDGE_RATIO: f64 = 0.05;

/// Brown-ratio and edge-density test for stacked lumber and trunks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicReport {
    pub brown_ratio: f64,
    pub edge_ratio: f64,
}

impl HeuristicReport {
    pub fn from_ratios(brown_ratio: f64, edge_ratio: f64) -> Self {
        Self {
            brown_ratio,
            edge_ratio,
        }
    }

    /// Mostly brown and carrying plank/trunk-like edges
    pub fn looks_like_wood(&self) -> bool {
        self.brown_ratio > MIN_BROWN_RATIO && self.edge_ratio > MIN_EDGE_RATIO
    }
}

pub fn edge_map(gray: &GrayImage) -> GrayImage {
    detect_edges(gray, CANNY_LOW, CANNY_HIGH)
}

pub fn edge_ratio(edges: &GrayImage) -> f64 {
    let total = edges.width() as u64 * edges.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let count = edges.pixels().filter(|p| p[0] > 0).count() as u64;
    count as f64 / total as f64
}

/// Evaluate the heuristic over a raw color mask and a precomputed edge map
pub fn evaluate(mask: &ColorMask, edges: &GrayImage) -> HeuristicReport {
    HeuristicReport::from_ratios(mask.coverage(), edge_ratio(edges))
}
