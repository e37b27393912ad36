//! Divider mask rendering.
//!
//! A divider is a parallelogram spanning the full canvas height, its left
//! edge running from `top_x` at y = 0 to `bottom_x` at y = H. Each mask is a
//! canvas-sized RGBA layer, transparent except for the filled band, which
//! the compositor lays over the placed images.

use super::calculations::Divider;
use image::{Rgba, RgbaImage};

/// Filled pixel columns `[start, end)` of `divider` on canvas row `y`.
///
/// A pixel is inside when its centre lies within `[left, left + width)`
/// on the row's centre line, so every row gets exactly `width` pixels
/// (less where the band leaves the canvas).
pub fn divider_row_span(
    divider: &Divider,
    y: u32,
    canvas_width: u32,
    canvas_height: u32,
) -> (u32, u32) {
    let left = divider.left_at(y as f64 + 0.5, canvas_height as f64);
    let clamp = |x: f64| x.clamp(0.0, canvas_width as f64) as u32;
    let start = (left - 0.5).ceil();
    (clamp(start), clamp(start + divider.width as f64))
}

/// Render one divider onto a transparent canvas-sized layer.
pub fn render_divider(
    divider: &Divider,
    canvas_width: u32,
    canvas_height: u32,
    color: Rgba<u8>,
) -> RgbaImage {
    let mut mask = RgbaImage::new(canvas_width, canvas_height);
    if divider.width == 0 {
        return mask;
    }
    for y in 0..canvas_height {
        let (start, end) = divider_row_span(divider, y, canvas_width, canvas_height);
        for x in start..end {
            mask.put_pixel(x, y, color);
        }
    }
    mask
}
