//! Ordered enhancement pipeline.
//!
//! ```text
//! orientation → normalize → brightness/saturation/hue → gamma → contrast → sharpen → alpha
//! ```
//!
//! Every stage produces a new buffer; the [`SourceImage`] is never touched.
//! Stages whose parameters are neutral are skipped, so identity parameters
//! return the oriented pixels unchanged (plus an opaque alpha channel).
//!
//! Enhancement is best-effort: [`enhance`] reports malformed input or
//! parameters as an [`EnhanceError`], and the render pipeline falls back to
//! the unenhanced image.

use super::backend::SourceImage;
use super::params::{EnhancementParams, LinearTransform, PercentileClip, SharpenKernel};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EnhanceError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("enhancement parameters are not finite")]
    NonFiniteParams,
    #[error("invalid percentile clip {lower}..{upper}")]
    InvalidClip { lower: f32, upper: f32 },
}

/// Run the full pipeline on one source image.
pub fn enhance(
    source: &SourceImage,
    params: &EnhancementParams,
) -> Result<DynamicImage, EnhanceError> {
    validate(source, params)?;

    let mut rgb = source.oriented().to_rgb8();

    if let Some(clip) = params.normalize {
        rgb = normalize(&rgb, clip);
    }
    if params.brightness != 1.0 || params.saturation != 1.0 {
        rgb = modulate(&rgb, params.brightness, params.saturation);
    }
    if params.hue_rotation != 0.0 {
        rgb = image::imageops::huerotate(&rgb, params.hue_rotation.round() as i32);
    }
    if params.gamma != 1.0 {
        rgb = apply_gamma(&rgb, params.gamma);
    }
    if !params.contrast.is_identity() {
        rgb = apply_linear(&rgb, params.contrast);
    }
    if let Some(kernel) = params.sharpen {
        rgb = sharpen(&rgb, &kernel);
    }

    Ok(DynamicImage::ImageRgba8(
        DynamicImage::ImageRgb8(rgb).to_rgba8(),
    ))
}

fn validate(source: &SourceImage, params: &EnhancementParams) -> Result<(), EnhanceError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(EnhanceError::EmptyImage { width, height });
    }
    if !params.is_finite() {
        return Err(EnhanceError::NonFiniteParams);
    }
    if let Some(PercentileClip { lower, upper }) = params.normalize {
        let in_range = |v: f32| (0.0..=100.0).contains(&v);
        if !in_range(lower) || !in_range(upper) || lower >= upper {
            return Err(EnhanceError::InvalidClip { lower, upper });
        }
    }
    Ok(())
}

/// Map every channel through a 256-entry lookup table.
fn map_lut(image: &RgbImage, lut: &[u8; 256]) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = lut[*c as usize];
        }
    }
    out
}

/// Build a lookup table from a function on the normalized 0–1 scale.
fn unit_lut(f: impl Fn(f32) -> f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = f(i as f32 / 255.0);
        *entry = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    lut
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Stretch the luminance range between two percentiles to the full 0–255 range.
fn normalize(image: &RgbImage, clip: PercentileClip) -> RgbImage {
    let mut bins = [0u64; 256];
    for p in image.pixels() {
        let [r, g, b] = p.0;
        let l = luma(r as f32, g as f32, b as f32).round().clamp(0.0, 255.0) as usize;
        bins[l] += 1;
    }
    let total: u64 = bins.iter().sum();
    let percentile = |pct: f32| {
        let target = (total as f64 * pct as f64 / 100.0).ceil().max(1.0) as u64;
        let mut seen = 0u64;
        for (value, &count) in bins.iter().enumerate() {
            seen += count;
            if seen >= target {
                return value as f32;
            }
        }
        255.0
    };
    let (lo, hi) = (percentile(clip.lower), percentile(clip.upper));
    if hi <= lo {
        return image.clone();
    }
    let lut = unit_lut(|v| (v * 255.0 - lo) / (hi - lo));
    map_lut(image, &lut)
}

/// Multiply brightness and scale saturation around each pixel's luma.
fn modulate(image: &RgbImage, brightness: f32, saturation: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = pixel.0.map(|c| c as f32);
        let l = luma(r, g, b);
        pixel.0 = [r, g, b].map(|c| {
            let v = (l + (c - l) * saturation) * brightness;
            v.round().clamp(0.0, 255.0) as u8
        });
    }
    out
}

/// `output = input^gamma` on the 0–1 scale.
fn apply_gamma(image: &RgbImage, gamma: f32) -> RgbImage {
    map_lut(image, &unit_lut(|v| v.powf(gamma)))
}

fn apply_linear(image: &RgbImage, transform: LinearTransform) -> RgbImage {
    map_lut(image, &unit_lut(|v| transform.apply(v)))
}

/// Unsharp mask with separate gains for flat areas and detail.
fn sharpen(image: &RgbImage, kernel: &SharpenKernel) -> RgbImage {
    if kernel.sigma <= 0.0 {
        return image.clone();
    }
    let blurred = image::imageops::blur(image, kernel.sigma);
    let mut out = image.clone();
    for (pixel, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for (c, &s) in pixel.0.iter_mut().zip(soft.0.iter()) {
            let diff = *c as f32 - s as f32;
            let gain = if diff.abs() <= kernel.threshold {
                kernel.strength
            } else {
                kernel.detail
            };
            let adjust = (diff * gain).clamp(-kernel.max, kernel.max);
            *c = (*c as f32 + adjust).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
