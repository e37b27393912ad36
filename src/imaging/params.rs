//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the deciding modules ([`adaptive`](super::adaptive),
//! [`calculations`](super::calculations), [`crate::optimize`]) and the modules
//! that do the pixel work ([`enhance`](super::enhance),
//! [`encode`](super::encode)).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality hint (1–100, default 85). Clamped on construction.
//! - [`SharpenKernel`]: Unsharp-mask parameters with separate flat/detail gains.
//! - [`LinearTransform`]: `output = input × multiply + offset` on the 0–1 scale.
//! - [`PercentileClip`]: Luminance percentiles for the dynamic-range stretch.
//! - [`EnhancementParams`]: The full, lookup-free parameter set for one image.
//! - [`PngOptions`]: Lossless or palette PNG encoding plus metadata stripping.

use image::Rgba;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Palette size used when this quality drives a palette encode.
    ///
    /// Scales linearly to 256 colors and never drops below 2.
    pub fn palette_colors(self) -> usize {
        ((256.0 * self.0 as f64 / 100.0).round() as usize).clamp(2, 256)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Unsharp-mask parameters.
///
/// - `sigma`: standard deviation of the Gaussian blur
/// - `strength`: gain applied where the local difference is at or below `threshold` (flat areas)
/// - `detail`: gain applied where the difference exceeds `threshold` (edges, texture)
/// - `threshold`: difference (0–255 scale) separating flat areas from detail
/// - `max`: cap on the per-channel adjustment in either direction (0–255 scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpenKernel {
    pub sigma: f32,
    pub strength: f32,
    pub detail: f32,
    pub threshold: f32,
    pub max: f32,
}

impl SharpenKernel {
    /// Shared baseline every profile scales from.
    pub const BASELINE: SharpenKernel = SharpenKernel {
        sigma: 0.8,
        strength: 1.0,
        detail: 2.0,
        threshold: 2.0,
        max: 10.0,
    };

    pub fn is_finite(&self) -> bool {
        [self.sigma, self.strength, self.detail, self.threshold, self.max]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Linear transform on the normalized 0–1 pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    pub multiply: f32,
    pub offset: f32,
}

impl LinearTransform {
    pub const IDENTITY: LinearTransform = LinearTransform {
        multiply: 1.0,
        offset: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, value: f32) -> f32 {
        value * self.multiply + self.offset
    }
}

/// Lower/upper luminance percentiles (0–100) for the normalize stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileClip {
    pub lower: f32,
    pub upper: f32,
}

impl Default for PercentileClip {
    fn default() -> Self {
        Self {
            lower: 1.0,
            upper: 99.0,
        }
    }
}

/// Fully specified correction values for one image.
///
/// Produced by [`adaptive`](super::adaptive), consumed by
/// [`enhance`](super::enhance) without further lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancementParams {
    pub normalize: Option<PercentileClip>,
    pub brightness: f32,
    pub saturation: f32,
    /// White-balance correction as a hue rotation in degrees.
    pub hue_rotation: f32,
    pub gamma: f32,
    pub contrast: LinearTransform,
    pub sharpen: Option<SharpenKernel>,
}

impl EnhancementParams {
    /// Parameters that leave every pixel unchanged.
    pub fn identity() -> Self {
        Self {
            normalize: None,
            brightness: 1.0,
            saturation: 1.0,
            hue_rotation: 0.0,
            gamma: 1.0,
            contrast: LinearTransform::IDENTITY,
            sharpen: None,
        }
    }

    pub fn is_finite(&self) -> bool {
        let scalars = [
            self.brightness,
            self.saturation,
            self.hue_rotation,
            self.gamma,
            self.contrast.multiply,
            self.contrast.offset,
        ];
        scalars.iter().all(|v| v.is_finite())
            && self.sharpen.is_none_or(|k| k.is_finite())
            && self
                .normalize
                .is_none_or(|c| c.lower.is_finite() && c.upper.is_finite())
    }
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self::identity()
    }
}

/// PNG encoding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngMode {
    /// Truecolor, exact source colors.
    Lossless,
    /// Indexed color with a median-cut palette of at most `max_colors` entries.
    Palette { max_colors: usize, dither: bool },
}

/// Options for a PNG encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngOptions {
    pub mode: PngMode,
    /// Omit ancillary text chunks.
    pub strip_metadata: bool,
}

impl PngOptions {
    pub fn lossless() -> Self {
        Self {
            mode: PngMode::Lossless,
            strip_metadata: false,
        }
    }

    pub fn palette(max_colors: usize, dither: bool) -> Self {
        Self {
            mode: PngMode::Palette {
                max_colors: max_colors.clamp(2, 256),
                dither,
            },
            strip_metadata: false,
        }
    }

    pub fn stripped(self) -> Self {
        Self {
            strip_metadata: true,
            ..self
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, String> {
    let hex = value.trim().trim_start_matches('#');
    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let invalid = || format!("invalid hex color: {value:?}");

    let chars: Vec<char> = hex.chars().collect();
    let digits: Vec<u8> = chars
        .iter()
        .map(|&c| nibble(c))
        .collect::<Option<_>>()
        .ok_or_else(invalid)?;

    match digits.len() {
        3 => Ok(Rgba([digits[0] * 17, digits[1] * 17, digits[2] * 17, 255])),
        6 | 8 => {
            let mut channels = [255u8; 4];
            for (i, pair) in digits.chunks(2).enumerate() {
                channels[i] = pair[0] * 16 + pair[1];
            }
            Ok(Rgba(channels))
        }
        _ => Err(invalid()),
    }
}
