use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::geometry::contour_area;
use imageproc::morphology::{close, open};
use imageproc::point::Point;

use crate::detection::color::is_wood_colored;
use crate::models::Region;

/// Half-width of the square structuring element (k = 2 gives a 5x5 square)
pub const MORPH_RADIUS: u8 = 2;

/// Binary "is wood-colored" mask, stored as 0 / 255 grayscale
#[derive(Debug, Clone)]
pub struct ColorMask {
    image: GrayImage,
}

impl ColorMask {
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] > 0
    }

    /// Number of wood-colored pixels
    pub fn count(&self) -> u64 {
        self.image.pixels().filter(|p| p[0] > 0).count() as u64
    }

    pub fn total(&self) -> u64 {
        let (w, h) = self.dimensions();
        w as u64 * h as u64
    }

    /// Share of the frame that is wood-colored
    pub fn coverage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count() as f64 / total as f64
    }
}

/// Everything segmentation produces for one image
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Union of the five brown range tests, before cleanup
    pub raw_mask: ColorMask,
    /// Raw mask after closing then opening
    pub cleaned_mask: ColorMask,
    /// Largest outer silhouette of the cleaned mask, if any
    pub region: Option<Region>,
}

/// Mark every pixel that falls in any brown range
pub fn build_mask(img: &RgbImage) -> ColorMask {
    let (width, height) = img.dimensions();
    let mask = GrayImage::from_fn(width, height, |x, y| {
        if is_wood_colored(img.get_pixel(x, y)) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    ColorMask::from_gray(mask)
}

/// Fill small gaps, then remove speckle noise, with the same square kernel
pub fn clean_mask(mask: &ColorMask, radius: u8) -> ColorMask {
    let closed = close(mask.as_gray(), Norm::LInf, radius);
    ColorMask::from_gray(open(&closed, Norm::LInf, radius))
}

/// Bounding box and enclosed area of one outer border
fn region_from_contour(points: &[Point<u32>]) -> Option<Region> {
    let first = points.first()?;
    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y)),
    );
    Some(Region::new(min_x, min_y, max_x, max_y, contour_area(points)))
}

/// Find the outermost blob whose outer contour encloses the largest area
pub fn largest_region(mask: &ColorMask) -> Option<Region> {
    // Blobs nested inside another blob's hole are part of that blob's silhouette
    find_contours::<u32>(mask.as_gray())
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| region_from_contour(&contour.points))
        // Ties go to the first blob in scan order so repeated scans agree
        .fold(None, |best: Option<Region>, region| match best {
            Some(b) if b.area() >= region.area() => Some(b),
            _ => Some(region),
        })
}

/// Run the full segmentation stage on a normalized RGB buffer
pub fn segment(img: &RgbImage) -> Segmentation {
    let raw_mask = build_mask(img);
    let cleaned_mask = clean_mask(&raw_mask, MORPH_RADIUS);
    let region = largest_region(&cleaned_mask);

    Segmentation {
        raw_mask,
        cleaned_mask,
        region,
    }
}
