//! Enhancement parameter derivation.
//!
//! Two calling conventions produce the same [`EnhancementParams`]:
//!
//! - **Multipliers**: explicit brightness / contrast / saturation / sharpness
//!   factors, applied the same way to every image.
//! - **Adaptive**: a named [`EnhancementLevel`] mapped to a 0–1 intensity;
//!   the correction values are derived from the image's measured statistics.
//!
//! ## Adaptive rules (0–1 scale, `i` = intensity)
//!
//! | Condition | Effect |
//! |---|---|
//! | brightness < 0.3 | brightness × (1 + 0.3i), gamma 1 − 0.2i |
//! | brightness > 0.7 | brightness × (1 − 0.2i) |
//! | otherwise | gamma 1 + 0.2i |
//! | mean stdev < 0.15 | contrast `x × (1 + 0.35i) − 0.1i` |
//! | saturation < 0.3 / > 0.7 | saturation × (1 + 0.25i) / (1 − 0.15i) |
//! | channel deviation > 0.1 | hue rotation `atan2(blue, red)` degrees |
//!
//! Gamma is applied as `output = input^gamma`, so values below one lift
//! shadows.

use super::params::{EnhancementParams, LinearTransform, PercentileClip, SharpenKernel};
use super::statistics::ImageStatistics;
use serde::{Deserialize, Serialize};

const DARK_THRESHOLD: f64 = 0.3;
const BRIGHT_THRESHOLD: f64 = 0.7;
const LOW_CONTRAST_THRESHOLD: f64 = 0.15;
const LOW_SATURATION_THRESHOLD: f64 = 0.3;
const HIGH_SATURATION_THRESHOLD: f64 = 0.7;
const COLOR_CAST_THRESHOLD: f64 = 0.1;

/// Named adaptive enhancement strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementLevel {
    None,
    Light,
    #[default]
    Medium,
    High,
}

impl EnhancementLevel {
    /// The 0–1 intensity scalar for this level.
    pub fn intensity(self) -> f32 {
        match self {
            EnhancementLevel::None => 0.0,
            EnhancementLevel::Light => 0.3,
            EnhancementLevel::Medium => 0.6,
            EnhancementLevel::High => 1.0,
        }
    }
}

/// Explicit enhancement factors; `1.0` leaves a property unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Multipliers {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Scales the baseline sharpening kernel; `0` disables sharpening.
    pub sharpness: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            sharpness: 1.0,
        }
    }
}

/// How the caller asked for enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementOptions {
    Level(EnhancementLevel),
    Multipliers(Multipliers),
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        EnhancementOptions::Level(EnhancementLevel::default())
    }
}

/// Which sharpening profile an image receives in adaptive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharpenProfile {
    /// Underexposed: a higher threshold keeps shadow noise from being amplified.
    Dark,
    /// Flat tonal range: stronger and wider sharpening.
    LowContrast,
    Standard,
}

impl SharpenProfile {
    pub fn for_stats(stats: &ImageStatistics) -> Self {
        if stats.brightness() < DARK_THRESHOLD {
            SharpenProfile::Dark
        } else if stats.contrast() < LOW_CONTRAST_THRESHOLD {
            SharpenProfile::LowContrast
        } else {
            SharpenProfile::Standard
        }
    }

    /// Scale the baseline kernel by this profile's intensity-weighted factors.
    pub fn kernel(self, intensity: f32) -> SharpenKernel {
        let i = intensity;
        let base = SharpenKernel::BASELINE;
        // (sigma, strength, detail, threshold, max) factor slopes
        let (s, st, d, t, m) = match self {
            SharpenProfile::LowContrast => (0.5, 0.5, 0.5, -0.5, 0.5),
            SharpenProfile::Dark => (0.25, -0.3, 0.25, 0.5, -0.2),
            SharpenProfile::Standard => (0.3, 0.3, 0.3, 0.0, 0.3),
        };
        SharpenKernel {
            sigma: base.sigma * (1.0 + s * i),
            strength: base.strength * (1.0 + st * i),
            detail: base.detail * (1.0 + d * i),
            threshold: base.threshold * (1.0 + t * i),
            max: base.max * (1.0 + m * i),
        }
    }
}

/// Map statistics and the requested options to concrete parameters.
pub fn derive_params(stats: &ImageStatistics, options: &EnhancementOptions) -> EnhancementParams {
    match options {
        EnhancementOptions::Multipliers(m) => from_multipliers(m),
        EnhancementOptions::Level(level) => adaptive(stats, level.intensity()),
    }
}

/// Uniform parameters from explicit factors, independent of image content.
pub fn from_multipliers(m: &Multipliers) -> EnhancementParams {
    let sharpen = (m.sharpness > 0.0).then(|| {
        let base = SharpenKernel::BASELINE;
        SharpenKernel {
            sigma: base.sigma * m.sharpness,
            strength: base.strength * m.sharpness,
            ..base
        }
    });
    EnhancementParams {
        brightness: m.brightness,
        saturation: m.saturation,
        contrast: LinearTransform {
            multiply: m.contrast,
            offset: 0.5 * (1.0 - m.contrast),
        },
        sharpen,
        ..EnhancementParams::identity()
    }
}

/// Statistics-driven parameters at the given 0–1 intensity.
pub fn adaptive(stats: &ImageStatistics, intensity: f32) -> EnhancementParams {
    let i = intensity.clamp(0.0, 1.0);
    if i == 0.0 {
        return EnhancementParams::identity();
    }

    let brightness = stats.brightness();
    let dark = brightness < DARK_THRESHOLD;
    let bright = brightness > BRIGHT_THRESHOLD;
    let low_contrast = stats.contrast() < LOW_CONTRAST_THRESHOLD;

    let brightness_factor = if dark {
        1.0 + 0.3 * i
    } else if bright {
        1.0 - 0.2 * i
    } else {
        1.0
    };

    let contrast = if low_contrast {
        LinearTransform {
            multiply: 1.0 + 0.35 * i,
            offset: -0.1 * i,
        }
    } else {
        LinearTransform::IDENTITY
    };

    let saturation = if stats.saturation < LOW_SATURATION_THRESHOLD {
        1.0 + 0.25 * i
    } else if stats.saturation > HIGH_SATURATION_THRESHOLD {
        1.0 - 0.15 * i
    } else {
        1.0
    };

    let gamma = if dark { 1.0 - 0.2 * i } else { 1.0 + 0.2 * i };

    EnhancementParams {
        normalize: Some(PercentileClip::default()),
        brightness: brightness_factor,
        saturation,
        hue_rotation: color_cast_rotation(stats),
        gamma,
        contrast,
        sharpen: Some(SharpenProfile::for_stats(stats).kernel(i)),
    }
}

/// Hue rotation (degrees) correcting a color cast, or 0 when there is none.
pub fn color_cast_rotation(stats: &ImageStatistics) -> f32 {
    let mean = stats.brightness();
    let offsets = stats.channels().map(|c| c.mean / 255.0 - mean);
    let largest = offsets.iter().fold(0f64, |acc, d| acc.max(d.abs()));
    if largest > COLOR_CAST_THRESHOLD {
        let (red, blue) = (offsets[0], offsets[2]);
        blue.atan2(red).to_degrees() as f32
    } else {
        0.0
    }
}
