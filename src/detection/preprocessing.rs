use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use image::{DynamicImage, GrayImage, RgbImage};
use image::imageops::FilterType;
use imageproc::edges::canny;
use rten_tensor::NdTensor;

use crate::error::ScanError;

/// Side length of the square buffer every scan works on
pub const INPUT_SIZE: u32 = 224;

/// Memory layout expected by a model's input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TensorLayout {
    /// 1 x H x W x 3, the layout Keras exports use
    #[default]
    Nhwc,
    /// 1 x 3 x H x W
    Nchw,
}

/// Pixel scaling applied before handing the buffer to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// x / 127.5 - 1, as MobileNet expects
    MobileNet,
    /// x / 255
    Unit,
}

impl Normalization {
    fn apply(self, channel: u8) -> f32 {
        match self {
            Normalization::MobileNet => channel as f32 / 127.5 - 1.0,
            Normalization::Unit => channel as f32 / 255.0,
        }
    }
}

/// Decoded, RGB, fixed-size image owned by one scan
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    rgb: RgbImage,
}

impl NormalizedImage {
    /// Convert any decoded image to RGB and resize it to the working size
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let rgb = if rgb.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
            rgb
        } else {
            image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        };
        Self { rgb }
    }

    /// Decode raw encoded image bytes (PNG, JPEG, ...)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScanError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ScanError::InvalidInput(format!("Failed to decode image: {}", e)))?;
        Ok(Self::from_image(&img))
    }

    /// Decode a base64 payload, optionally prefixed with a data URL header
    pub fn from_base64(payload: &str) -> Result<Self, ScanError> {
        let encoded = strip_data_url(payload).trim();
        if encoded.is_empty() {
            return Err(ScanError::InvalidInput("No image data provided".to_string()));
        }

        let bytes = B64
            .decode(encoded)
            .map_err(|e| ScanError::InvalidInput(format!("Invalid base64 image data: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgb.dimensions()
    }

    pub fn to_grayscale(&self) -> GrayImage {
        to_grayscale(&self.rgb)
    }

    /// Build a batch-of-one model input tensor
    pub fn to_tensor(&self, layout: TensorLayout, normalization: Normalization) -> NdTensor<f32, 4> {
        let (w, h) = self.dimensions();
        let (w, h) = (w as usize, h as usize);

        let shape = match layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        };

        let mut data = vec![0.0f32; 3 * w * h];
        for (x, y, pixel) in self.rgb.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let index = match layout {
                    TensorLayout::Nhwc => (y * w + x) * 3 + c,
                    TensorLayout::Nchw => c * w * h + y * w + x,
                };
                data[index] = normalization.apply(pixel[c]);
            }
        }

        NdTensor::from_data(shape, data)
    }
}

/// Drop a `data:image/...;base64,` style header if present
fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    }
}

/// Convert image to grayscale
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
