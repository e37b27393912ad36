//! Median-cut color quantization.
//!
//! [`Palette`] implements [`image::imageops::ColorMap`], so the stock
//! Floyd–Steinberg [`dither`](image::imageops::dither) and
//! [`index_colors`](image::imageops::index_colors) routines drive it.

use image::imageops::{self, ColorMap};
use image::{Rgb, RgbImage};
use std::collections::HashMap;

/// Quantization levels per channel in the nearest-color lookup grid.
const GRID_BITS: u32 = 5;
const GRID_SIZE: usize = 1 << GRID_BITS;
const GRID_SHIFT: u32 = 8 - GRID_BITS;

/// An indexed color palette of at most 256 entries.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
    exact: HashMap<[u8; 3], u8>,
    grid: Vec<u8>,
}

impl Palette {
    /// Build a palette from explicit colors. At most 256 are kept; an empty
    /// list becomes a single black entry.
    pub fn from_colors(mut colors: Vec<Rgb<u8>>) -> Self {
        colors.truncate(256);
        if colors.is_empty() {
            colors.push(Rgb([0, 0, 0]));
        }

        let mut exact = HashMap::with_capacity(colors.len());
        for (i, c) in colors.iter().enumerate() {
            exact.entry(c.0).or_insert(i as u8);
        }

        let mut grid = Vec::with_capacity(GRID_SIZE * GRID_SIZE * GRID_SIZE);
        for r in 0..GRID_SIZE {
            for g in 0..GRID_SIZE {
                for b in 0..GRID_SIZE {
                    let centre = |v: usize| ((v << GRID_SHIFT) + (1 << (GRID_SHIFT - 1))) as u8;
                    grid.push(nearest_index(&colors, [centre(r), centre(g), centre(b)]));
                }
            }
        }

        Self {
            colors,
            exact,
            grid,
        }
    }

    /// Median-cut quantization of `image` down to `max_colors` (2–256).
    ///
    /// Images that already use no more than `max_colors` distinct colors get
    /// an exact palette.
    pub fn median_cut(image: &RgbImage, max_colors: usize) -> Self {
        let max_colors = max_colors.clamp(2, 256);

        let mut histogram: HashMap<[u8; 3], u32> = HashMap::new();
        for pixel in image.pixels() {
            *histogram.entry(pixel.0).or_insert(0) += 1;
        }

        if histogram.len() <= max_colors {
            let mut colors: Vec<[u8; 3]> = histogram.into_keys().collect();
            colors.sort_unstable();
            return Self::from_colors(colors.into_iter().map(Rgb).collect());
        }

        let mut boxes = vec![ColorBox {
            colors: histogram.into_iter().collect(),
        }];
        while boxes.len() < max_colors {
            let widest = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.colors.len() > 1)
                .map(|(i, b)| (i, b.widest_channel()))
                .max_by_key(|&(_, (_, extent))| extent);
            let Some((index, (channel, extent))) = widest else {
                break;
            };
            if extent == 0 {
                break;
            }
            let upper = boxes[index].split(channel);
            boxes.push(upper);
        }

        Self::from_colors(boxes.iter().map(ColorBox::mean).collect())
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Flat `RGBRGB…` bytes, as stored in a PNG `PLTE` chunk.
    pub fn to_plte(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }

    /// Map every pixel of `image` to a palette index, optionally with
    /// Floyd–Steinberg error diffusion.
    pub fn quantize(&self, image: &RgbImage, dither: bool) -> Vec<u8> {
        if dither {
            let mut dithered = image.clone();
            imageops::dither(&mut dithered, self);
            imageops::index_colors(&dithered, self).into_raw()
        } else {
            imageops::index_colors(image, self).into_raw()
        }
    }
}

impl ColorMap for Palette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        if let Some(&i) = self.exact.get(&color.0) {
            return i as usize;
        }
        let [r, g, b] = color.0.map(|v| (v >> GRID_SHIFT) as usize);
        self.grid[(r * GRID_SIZE + g) * GRID_SIZE + b] as usize
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        *color = self.colors[self.index_of(color)];
    }
}

fn nearest_index(colors: &[Rgb<u8>], target: [u8; 3]) -> u8 {
    let distance = |c: &Rgb<u8>| -> u32 {
        c.0.iter()
            .zip(target)
            .map(|(&a, b)| (a as i32 - b as i32).pow(2) as u32)
            .sum()
    };
    colors
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| distance(c))
        .map_or(0, |(i, _)| i as u8)
}

/// A set of distinct colors with their pixel counts.
struct ColorBox {
    colors: Vec<([u8; 3], u32)>,
}

impl ColorBox {
    /// Channel with the largest value range, and that range.
    fn widest_channel(&self) -> (usize, u8) {
        (0..3)
            .map(|ch| {
                let (lo, hi) = self
                    .colors
                    .iter()
                    .fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| {
                        (lo.min(c[ch]), hi.max(c[ch]))
                    });
                (ch, hi.saturating_sub(lo))
            })
            .max_by_key(|&(_, extent)| extent)
            .unwrap_or((0, 0))
    }

    /// Split at the pixel-weighted median of `channel`; `self` keeps the
    /// lower half and the upper half is returned. Both halves are non-empty.
    fn split(&mut self, channel: usize) -> ColorBox {
        self.colors.sort_unstable_by_key(|(c, _)| c[channel]);
        let total: u64 = self.colors.iter().map(|&(_, n)| n as u64).sum();
        let mut running = 0u64;
        let mut cut = self.colors.len() - 1;
        for (i, &(_, n)) in self.colors.iter().enumerate() {
            running += n as u64;
            if running * 2 >= total {
                cut = i + 1;
                break;
            }
        }
        let cut = cut.clamp(1, self.colors.len() - 1);
        ColorBox {
            colors: self.colors.split_off(cut),
        }
    }

    /// Pixel-weighted mean color.
    fn mean(&self) -> Rgb<u8> {
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for &(c, n) in &self.colors {
            for ch in 0..3 {
                sum[ch] += c[ch] as u64 * n as u64;
            }
            count += n as u64;
        }
        let count = count.max(1);
        Rgb(sum.map(|s| ((s + count / 2) / count) as u8))
    }
}
