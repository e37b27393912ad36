//! Canvas assembly.
//!
//! Each source is resized to cover its slot's cover rectangle (scale to
//! fill, centre-crop), then copied onto the canvas row by row inside the
//! pixels the slot owns. Divider masks are alpha-blended on top, in order.

use super::calculations::{Layout, Slot};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// A blank canvas filled with `background`.
pub fn new_canvas(width: u32, height: u32, background: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, background)
}

/// Resize `image` to fill `slot`'s cover rectangle, centre-cropping the
/// overflow, with Lanczos3 resampling.
pub fn fit_to_slot(image: &DynamicImage, slot: &Slot, canvas_height: u32) -> RgbaImage {
    image
        .resize_to_fill(slot.cover_width, canvas_height, FilterType::Lanczos3)
        .to_rgba8()
}

/// Copy each placed image into the pixels its slot owns, then blend the
/// divider masks over the seams.
///
/// `placed[i]` must have been produced by [`fit_to_slot`] for
/// `layout.slots[i]`. Owned pixels that fall outside the cover rectangle
/// lie underneath a divider and take the nearest edge column.
pub fn composite(
    layout: &Layout,
    placed: &[RgbaImage],
    masks: &[RgbaImage],
    background: Rgba<u8>,
) -> RgbaImage {
    let mut canvas = new_canvas(layout.canvas_width, layout.canvas_height, background);

    for (slot, image) in layout.slots.iter().zip(placed) {
        let Some(last_column) = image.width().checked_sub(1) else {
            continue;
        };
        for y in 0..layout.canvas_height.min(image.height()) {
            let (start, end) = layout.slot_row_span(slot.index, y);
            for x in start..end {
                // Seam pixels just outside the cover rectangle repeat its edge column
                let local = x.saturating_sub(slot.cover_left).min(last_column);
                canvas.put_pixel(x, y, *image.get_pixel(local, y));
            }
        }
    }

    for mask in masks {
        imageops::overlay(&mut canvas, mask, 0, 0);
    }
    canvas
}
