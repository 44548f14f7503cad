#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Pixel checkerboard: sharp (high Laplacian variance) with mean `(a + b) / 2`.
pub fn checkerboard(w: u32, h: u32, a: u8, b: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        let v = if (x + y) % 2 == 0 { a } else { b };
        Rgb([v, v, v])
    }))
}

pub fn flat(w: u32, h: u32, v: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([v, v, v])))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Writes a lossless image that passes every quality check.
pub fn write_good(path: &Path) {
    checkerboard(256, 256, 100, 150)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn write_small(path: &Path) {
    checkerboard(120, 120, 100, 150)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn write_blurry(path: &Path) {
    flat(256, 256, 128)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn write_corrupted(path: &Path) {
    std::fs::write(path, b"this is not an image at all").unwrap();
}
