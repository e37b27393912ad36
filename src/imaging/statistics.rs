//! Single-pass pixel statistics.
//!
//! Everything the layout selector and the adaptive enhancer need to know
//! about an image comes from here: per-channel mean / standard deviation /
//! extremes on the 0–255 scale, mean HSV saturation, aspect ratio and,
//! when requested, the Shannon entropy of the grayscale histogram.

use image::DynamicImage;

/// Summary of one color channel, on the 0–255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    pub mean: f64,
    pub stdev: f64,
    pub min: u8,
    pub max: u8,
}

/// Statistics for one decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStatistics {
    pub red: ChannelStats,
    pub green: ChannelStats,
    pub blue: ChannelStats,
    /// Mean HSV saturation, 0–1.
    pub saturation: f64,
    /// Grayscale histogram entropy in bits (0–8), when computed.
    pub entropy: Option<f64>,
    /// Width divided by height.
    pub aspect_ratio: f64,
}

impl ImageStatistics {
    pub fn channels(&self) -> [ChannelStats; 3] {
        [self.red, self.green, self.blue]
    }

    /// Mean of the three channel means, normalized to 0–1.
    pub fn brightness(&self) -> f64 {
        self.channels().iter().map(|c| c.mean).sum::<f64>() / 3.0 / 255.0
    }

    /// Mean of the three channel standard deviations, normalized to 0–1.
    pub fn contrast(&self) -> f64 {
        self.channels().iter().map(|c| c.stdev).sum::<f64>() / 3.0 / 255.0
    }
}

/// Compute channel statistics, saturation and aspect ratio.
///
/// Set `with_entropy` to also build the 256-bin grayscale histogram.
pub fn analyze(image: &DynamicImage, with_entropy: bool) -> ImageStatistics {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let count = (width as u64 * height as u64).max(1) as f64;

    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    let mut saturation_sum = 0f64;

    for pixel in rgb.pixels() {
        let mut hi = 0u8;
        let mut lo = u8::MAX;
        for (c, &v) in pixel.0.iter().enumerate() {
            let f = v as f64;
            sum[c] += f;
            sum_sq[c] += f * f;
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
            hi = hi.max(v);
            lo = lo.min(v);
        }
        if hi > 0 {
            saturation_sum += (hi - lo) as f64 / hi as f64;
        }
    }

    let channel = |c: usize| {
        if width == 0 || height == 0 {
            return ChannelStats::default();
        }
        let mean = sum[c] / count;
        let variance = (sum_sq[c] / count - mean * mean).max(0.0);
        ChannelStats {
            mean,
            stdev: variance.sqrt(),
            min: min[c],
            max: max[c],
        }
    };

    ImageStatistics {
        red: channel(0),
        green: channel(1),
        blue: channel(2),
        saturation: saturation_sum / count,
        entropy: with_entropy.then(|| grayscale_entropy(image)),
        aspect_ratio: if height == 0 {
            0.0
        } else {
            width as f64 / height as f64
        },
    }
}

/// 256-bin grayscale intensity histogram.
pub fn grayscale_histogram(image: &DynamicImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for pixel in image.to_luma8().pixels() {
        bins[pixel.0[0] as usize] += 1;
    }
    bins
}

/// Shannon entropy (base 2) of a histogram; empty bins are skipped.
pub fn histogram_entropy(bins: &[u64]) -> f64 {
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let entropy: f64 = bins
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();
    // A single occupied bin yields -0.0; report it as plain zero.
    entropy.max(0.0)
}

/// Shannon entropy of the image's grayscale histogram, in bits.
pub fn grayscale_entropy(image: &DynamicImage) -> f64 {
    histogram_entropy(&grayscale_histogram(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, noise_image, solid_image};

    #[test]
    fn solid_color_channel_stats() {
        let stats = analyze(&solid_image(40, 30, [200, 100, 0]), false);
        assert_eq!(stats.red.mean, 200.0);
        assert_eq!(stats.green.mean, 100.0);
        assert_eq!(stats.blue.mean, 0.0);
        assert_eq!(stats.red.stdev, 0.0);
        assert_eq!((stats.red.min, stats.red.max), (200, 200));
        assert_eq!(stats.entropy, None);
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let stats = analyze(&solid_image(160, 90, [0, 0, 0]), false);
        assert!((stats.aspect_ratio - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn gray_has_zero_saturation() {
        let stats = analyze(&solid_image(8, 8, [90, 90, 90]), false);
        assert_eq!(stats.saturation, 0.0);
    }

    #[test]
    fn pure_red_is_fully_saturated() {
        let stats = analyze(&solid_image(8, 8, [255, 0, 0]), false);
        assert_eq!(stats.saturation, 1.0);
    }

    #[test]
    fn black_has_zero_saturation() {
        let stats = analyze(&solid_image(8, 8, [0, 0, 0]), false);
        assert_eq!(stats.saturation, 0.0);
        assert_eq!(stats.brightness(), 0.0);
    }

    #[test]
    fn two_level_image_stdev() {
        // Half black, half white: mean 127.5, stdev 127.5
        let img = image::RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let stats = analyze(&DynamicImage::ImageRgb8(img), false);
        assert!((stats.red.mean - 127.5).abs() < 1e-9);
        assert!((stats.red.stdev - 127.5).abs() < 1e-9);
        assert!((stats.contrast() - 0.5).abs() < 1e-9);
    }

    // =========================================================================
    // Entropy tests
    // =========================================================================

    #[test]
    fn single_color_entropy_is_zero() {
        let stats = analyze(&solid_image(50, 50, [12, 200, 7]), true);
        assert_eq!(stats.entropy, Some(0.0));
    }

    #[test]
    fn two_equal_bins_is_one_bit() {
        let mut bins = [0u64; 256];
        bins[0] = 100;
        bins[255] = 100;
        assert!((histogram_entropy(&bins) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_histogram_is_eight_bits() {
        let bins = [7u64; 256];
        assert!((histogram_entropy(&bins) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn empty_histogram_is_zero() {
        assert_eq!(histogram_entropy(&[0u64; 256]), 0.0);
    }

    #[test]
    fn random_grayscale_approaches_eight_bits() {
        let entropy = grayscale_entropy(&noise_image(512, 512, 7));
        assert!(entropy > 7.9, "entropy {entropy}");
        assert!(entropy <= 8.0);
    }

    #[test]
    fn full_gradient_fills_every_bin() {
        // Every intensity appears exactly once per row
        let entropy = grayscale_entropy(&gradient_image(256, 4));
        assert!((entropy - 8.0).abs() < 1e-9);
    }
}
