//! HSV conversion and the brown color ranges that define "wood-colored".
//!
//! Values use the OpenCV 8-bit convention: hue in [0, 180), saturation and
//! value in [0, 255].

use image::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn from_rgb(pixel: &Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let delta = max - min;

        let s = if max == 0.0 { 0.0 } else { delta / max * 255.0 };

        let hue_deg = if delta == 0.0 {
            0.0
        } else if max == rf {
            60.0 * (gf - bf) / delta
        } else if max == gf {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        let hue_deg = if hue_deg < 0.0 { hue_deg + 360.0 } else { hue_deg };

        Self {
            h: ((hue_deg / 2.0).round() as u16 % 180) as u8,
            s: s.round() as u8,
            v: max as u8,
        }
    }
}

/// Inclusive HSV box
#[derive(Debug, Clone, Copy)]
pub struct BrownRange {
    pub name: &'static str,
    pub lower: Hsv,
    pub upper: Hsv,
}

impl BrownRange {
    const fn new(name: &'static str, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            name,
            lower: Hsv { h: lower[0], s: lower[1], v: lower[2] },
            upper: Hsv { h: upper[0], s: upper[1], v: upper[2] },
        }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

/// Empirically tuned sub-ranges that together cover the brown spectrum.
pub const BROWN_RANGES: [BrownRange; 5] = [
    BrownRange::new("reddish brown", [0, 50, 20], [10, 255, 200]),
    BrownRange::new("orange brown", [10, 60, 40], [20, 255, 230]),
    BrownRange::new("yellow brown", [20, 40, 60], [30, 200, 240]),
    BrownRange::new("muted brown", [0, 15, 30], [30, 60, 180]),
    BrownRange::new("pale brown", [5, 20, 180], [30, 120, 255]),
];

pub fn is_wood_colored(pixel: &Rgb<u8>) -> bool {
    let hsv = Hsv::from_rgb(pixel);
    BROWN_RANGES.iter().any(|range| range.contains(hsv))
}
