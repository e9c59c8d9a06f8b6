use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use cocoscan::detection::NormalizedImage;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Working size of the pipeline; fixtures at this size skip resizing
pub const SIZE: u32 = 224;

/// Colors for tests
pub const WOOD_BROWN: Rgb<u8> = Rgb([160, 100, 50]);
pub const DARK_BROWN: Rgb<u8> = Rgb([101, 67, 33]);
pub const TAN: Rgb<u8> = Rgb([210, 180, 140]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const LEAF_GREEN: Rgb<u8> = Rgb([30, 160, 40]);
pub const SKY_BLUE: Rgb<u8> = Rgb([40, 60, 200]);

pub fn solid(color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(SIZE, SIZE, color)
}

/// A filled rectangle of `fg` on a `bg` background
pub fn rect_on(bg: Rgb<u8>, fg: Rgb<u8>, x: u32, y: u32, width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |px, py| {
        if px >= x && px < x + width && py >= y && py < y + height {
            fg
        } else {
            bg
        }
    })
}

/// Horizontal brown and white stripes, like a stack of planks
pub fn plank_stack(stripe: u32) -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |_, y| {
        if (y / stripe) % 2 == 0 {
            WOOD_BROWN
        } else {
            WHITE
        }
    })
}

pub fn normalized(img: RgbImage) -> NormalizedImage {
    NormalizedImage::from_image(&DynamicImage::ImageRgb8(img))
}

pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode test image");
    buf.into_inner()
}

pub fn base64_png(img: &RgbImage) -> String {
    B64.encode(png_bytes(img))
}

pub fn data_url_png(img: &RgbImage) -> String {
    format!("data:image/png;base64,{}", base64_png(img))
}
