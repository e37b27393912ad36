//! Shared test utilities for the thumbsplit test suite.
//!
//! Synthetic images (solid colors, gradients, seeded noise) and the encoders
//! needed to put them on disk or in memory as real files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let paths = write_solid_pngs(tmp.path(), &[[255, 0, 0], [0, 0, 255]], 320, 180);
//! let stats = analyze(&noise_image(64, 64, 3), true);
//! ```

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic images
// =========================================================================

/// A single-color RGB image.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Grayscale ramp: the pixel value is the column index (mod 256).
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
        Luma([(x % 256) as u8])
    }))
}

/// Deterministic grayscale noise from a xorshift generator.
pub fn noise_image(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 56) as u8
    };
    let mut img = GrayImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Luma([next()]);
    }
    DynamicImage::ImageLuma8(img)
}

// =========================================================================
// Encoders
// =========================================================================

/// Encode as PNG in memory.
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Encode as JPEG with an EXIF APP1 segment carrying `orientation` (1–8).
pub fn jpeg_bytes_with_orientation(image: &DynamicImage, orientation: u16) -> Vec<u8> {
    let mut jpeg = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .unwrap();
    let jpeg = jpeg.into_inner();

    // Big-endian TIFF header, one IFD entry: 0x0112 Orientation, SHORT, count 1
    let mut payload = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01".to_vec();
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Fixture files
// =========================================================================

/// Write one solid-color PNG per entry of `colors` into `dir`, returning
/// the paths in order.
pub fn write_solid_pngs(dir: &Path, colors: &[[u8; 3]], width: u32, height: u32) -> Vec<PathBuf> {
    colors
        .iter()
        .enumerate()
        .map(|(i, &rgb)| {
            let path = dir.join(format!("source-{i}.png"));
            std::fs::write(&path, png_bytes(&solid_image(width, height, rgb))).unwrap();
            path
        })
        .collect()
}
