//! Pure geometry for the split layout.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Coordinate conventions
//!
//! ```text
//!  x = 0                     p₁                      p₂                 W
//!  ┌──────────────────────┬─/──/──┬─────────────────/──/──┬────────────┐ y = 0
//!  │        slot 0        │/  /   │       slot 1    /  /   │   slot 2   │
//!  │                      /  /    │                /  /    │            │
//!  └─────────────────────/──/─────┴───────────────/──/─────┴────────────┘ y = H
//!                     top_x  top_x + width
//! ```
//!
//! A divider is a quadrilateral whose left edge runs from `top_x` at `y = 0`
//! to `bottom_x` at `y = H`; the right edge is the left edge shifted by the
//! divider width. The horizontal shift between top and bottom is the *tilt
//! displacement*, `tan(tilt) × H`, split evenly around the base position.

/// Output canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1280;
/// Output canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 720;

/// Number of slots (and source images) on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitCount {
    Two,
    Three,
}

impl SplitCount {
    pub fn get(self) -> usize {
        match self {
            SplitCount::Two => 2,
            SplitCount::Three => 3,
        }
    }
}

impl std::fmt::Display for SplitCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// One internal boundary between two slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub index: usize,
    /// Base centre position, `floor(W / n × (index + 1))`.
    pub position: u32,
    pub width: u32,
    /// Left edge x at the top of the canvas.
    pub top_x: f64,
    /// Left edge x at the bottom of the canvas.
    pub bottom_x: f64,
}

impl Divider {
    /// Left edge x at vertical position `y` (0 = top, `height` = bottom).
    pub fn left_at(&self, y: f64, height: f64) -> f64 {
        self.top_x + (self.bottom_x - self.top_x) * (y / height)
    }

    /// Centre line x at vertical position `y`.
    pub fn center_at(&self, y: f64, height: f64) -> f64 {
        self.left_at(y, height) + self.width as f64 / 2.0
    }

    fn min_left(&self) -> f64 {
        self.top_x.min(self.bottom_x)
    }

    fn max_left(&self) -> f64 {
        self.top_x.max(self.bottom_x)
    }
}

/// A canvas region assigned to one source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    /// Nominal slot width.
    pub width: u32,
    /// Nominal left offset.
    pub offset: u32,
    /// Left edge of the rectangle the resized image is placed into.
    pub cover_left: u32,
    /// Width the source image is resized (and centre-cropped) to.
    pub cover_width: u32,
}

/// Divider and slot geometry for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub split: SplitCount,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub divider_width: u32,
    pub tilt_displacement: f64,
    pub dividers: Vec<Divider>,
    pub slots: Vec<Slot>,
}

impl Layout {
    pub fn divider_positions(&self) -> Vec<u32> {
        self.dividers.iter().map(|d| d.position).collect()
    }

    pub fn slot_widths(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.width).collect()
    }

    pub fn slot_offsets(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.offset).collect()
    }

    /// Pixel columns `[start, end)` owned by `slot` on canvas row `y`.
    ///
    /// A slot owns the pixels whose centres lie between the centre lines of
    /// its neighbouring dividers; the first and last slots extend to the
    /// canvas edges. Dividers are drawn over the seam afterwards.
    pub fn slot_row_span(&self, slot: usize, y: u32) -> (u32, u32) {
        let height = self.canvas_height as f64;
        let row = y as f64 + 0.5;
        let left = match slot.checked_sub(1).and_then(|i| self.dividers.get(i)) {
            Some(d) => d.center_at(row, height),
            None => 0.0,
        };
        let right = match self.dividers.get(slot) {
            Some(d) => d.center_at(row, height),
            None => self.canvas_width as f64,
        };
        (
            pixel_start(left, self.canvas_width),
            pixel_start(right, self.canvas_width),
        )
    }
}

/// First pixel column whose centre is at or right of `x`, clamped to the canvas.
fn pixel_start(x: f64, canvas_width: u32) -> u32 {
    (x - 0.5).ceil().clamp(0.0, canvas_width as f64) as u32
}

/// Horizontal shift between a divider's top and bottom edge.
///
/// # Examples
/// ```
/// # use thumbsplit::imaging::tilt_displacement;
/// assert_eq!(tilt_displacement(0.0, 720), 0.0);
/// assert!((tilt_displacement(45.0, 720) - 720.0).abs() < 1e-6);
/// ```
pub fn tilt_displacement(tilt_degrees: f64, canvas_height: u32) -> f64 {
    (tilt_degrees * std::f64::consts::PI / 180.0).tan() * canvas_height as f64
}

/// Compute divider positions, slot widths and slot offsets.
///
/// Slot widths follow the nominal formulas:
/// - first: first divider position, reduced by `|displacement|` for negative tilt
/// - middle: distance between consecutive divider positions minus the divider width
/// - last: canvas width minus last divider position minus the divider width
///
/// Every width is floored at `W / n − 2 × divider_width` (and at least one pixel)
/// so extreme tilt/width combinations still leave usable slots. At tilt 0 the
/// slot widths plus divider widths sum to exactly the canvas width.
///
/// Each slot also gets a cover rectangle. At tilt 0 it is the nominal offset
/// with `width + 2 × divider_width` of overscan; under tilt it widens to span
/// from the leftmost right edge of the previous divider to the rightmost left
/// edge of the next one, so no background shows along a slanted seam. The
/// widening is capped at the canvas edge.
pub fn compute_layout(
    split: SplitCount,
    canvas_width: u32,
    canvas_height: u32,
    divider_width: u32,
    tilt_degrees: f64,
) -> Layout {
    let n = split.get();
    let w = divider_width as f64;
    let displacement = tilt_displacement(tilt_degrees, canvas_height);
    let section = canvas_width as f64 / n as f64;

    let dividers: Vec<Divider> = (1..n)
        .map(|i| {
            let position = (section * i as f64).floor() as u32;
            let p = position as f64;
            Divider {
                index: i - 1,
                position,
                width: divider_width,
                top_x: p - displacement / 2.0 - w / 2.0,
                bottom_x: p + displacement / 2.0 - w / 2.0,
            }
        })
        .collect();

    let min_width = (section - 2.0 * w).max(1.0);
    let slots = (0..n)
        .map(|i| {
            let raw_width = if i == 0 {
                let first = dividers[0].position as f64;
                if displacement < 0.0 {
                    first - displacement.abs()
                } else {
                    first
                }
            } else if i == n - 1 {
                canvas_width as f64 - dividers[i - 1].position as f64 - w
            } else {
                dividers[i].position as f64 - dividers[i - 1].position as f64 - w
            };
            let width = raw_width.max(min_width).floor() as u32;

            let offset = match i {
                0 => 0,
                _ => (dividers[i - 1].position as f64 + w / 2.0).floor() as u32,
            };

            let cover_left = match i {
                0 => 0,
                _ => {
                    let right_edge = (dividers[i - 1].min_left() + w).floor().max(0.0) as u32;
                    offset.min(right_edge)
                }
            };
            let cover_right = match dividers.get(i) {
                Some(d) => d.max_left().ceil().max(0.0) as u32,
                None => canvas_width,
            };
            // Tilt widening stops at the canvas edge; row spans never reach past it
            let cover_width = (width + 2 * divider_width)
                .max(cover_right.min(canvas_width).saturating_sub(cover_left))
                .max(1);

            Slot {
                index: i,
                width,
                offset,
                cover_left,
                cover_width,
            }
        })
        .collect();

    Layout {
        split,
        canvas_width,
        canvas_height,
        divider_width,
        tilt_displacement: displacement,
        dividers,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(split: SplitCount, width: u32, tilt: f64) -> Layout {
        compute_layout(split, CANVAS_WIDTH, CANVAS_HEIGHT, width, tilt)
    }

    // =========================================================================
    // tilt_displacement tests
    // =========================================================================

    #[test]
    fn displacement_zero_tilt() {
        assert_eq!(tilt_displacement(0.0, 720), 0.0);
    }

    #[test]
    fn displacement_45_degrees_equals_height() {
        assert!((tilt_displacement(45.0, 720) - 720.0).abs() < 1e-6);
    }

    #[test]
    fn displacement_is_odd_in_tilt() {
        for tilt in [5.0, 17.5, 30.0, 60.0] {
            assert_eq!(tilt_displacement(-tilt, 720), -tilt_displacement(tilt, 720));
        }
    }

    // =========================================================================
    // Untilted layout tests
    // =========================================================================

    #[test]
    fn three_way_positions_are_floored_thirds() {
        let l = layout(SplitCount::Three, 10, 0.0);
        assert_eq!(l.divider_positions(), vec![426, 853]);
    }

    #[test]
    fn two_way_position_is_half() {
        let l = layout(SplitCount::Two, 10, 0.0);
        assert_eq!(l.divider_positions(), vec![640]);
    }

    #[test]
    fn three_way_slot_widths_and_offsets() {
        let l = layout(SplitCount::Three, 10, 0.0);
        assert_eq!(l.slot_widths(), vec![426, 417, 417]);
        assert_eq!(l.slot_offsets(), vec![0, 431, 858]);
    }

    #[test]
    fn two_way_slot_widths_and_offsets() {
        let l = layout(SplitCount::Two, 10, 0.0);
        assert_eq!(l.slot_widths(), vec![640, 630]);
        assert_eq!(l.slot_offsets(), vec![0, 645]);
    }

    #[test]
    fn widths_sum_to_canvas_at_zero_tilt() {
        for split in [SplitCount::Two, SplitCount::Three] {
            for width in 0..=60 {
                let l = layout(split, width, 0.0);
                let slots: u32 = l.slot_widths().iter().sum();
                let dividers = width * (split.get() as u32 - 1);
                assert_eq!(
                    slots + dividers,
                    CANVAS_WIDTH,
                    "split {split}, divider width {width}"
                );
            }
        }
    }

    #[test]
    fn zero_tilt_dividers_are_vertical() {
        let l = layout(SplitCount::Three, 10, 0.0);
        for d in &l.dividers {
            assert_eq!(d.top_x, d.bottom_x);
            assert_eq!(d.top_x, d.position as f64 - 5.0);
        }
    }

    #[test]
    fn zero_tilt_cover_is_nominal_overscan() {
        let l = layout(SplitCount::Three, 10, 0.0);
        for s in &l.slots {
            assert_eq!(s.cover_left, s.offset);
            assert_eq!(s.cover_width, s.width + 20);
        }
    }

    #[test]
    fn zero_width_dividers_leave_plain_thirds() {
        let l = layout(SplitCount::Three, 0, 0.0);
        assert_eq!(l.slot_widths(), vec![426, 427, 427]);
        assert_eq!(l.slot_offsets(), vec![0, 426, 853]);
    }

    // =========================================================================
    // Tilted layout tests
    // =========================================================================

    #[test]
    fn tilt_45_halves_displacement_around_position() {
        let l = layout(SplitCount::Three, 10, 45.0);
        for d in &l.dividers {
            let p = d.position as f64;
            assert!((d.top_x - (p - 360.0 - 5.0)).abs() < 1e-6);
            assert!((d.bottom_x - (p + 360.0 - 5.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn tilt_is_mirror_symmetric() {
        for tilt in [3.0, 15.0, 45.0, 60.0] {
            let pos = layout(SplitCount::Three, 12, tilt);
            let neg = layout(SplitCount::Three, 12, -tilt);
            assert_eq!(pos.divider_positions(), neg.divider_positions());
            for (a, b) in pos.dividers.iter().zip(&neg.dividers) {
                assert_eq!(a.top_x, b.bottom_x);
                assert_eq!(a.bottom_x, b.top_x);
            }
        }
    }

    #[test]
    fn negative_tilt_shrinks_first_slot_to_floor() {
        let l = layout(SplitCount::Three, 10, -10.0);
        // 426 - tan(10°)·720 ≈ 299, floored at 1280/3 - 20 ≈ 406
        assert_eq!(l.slots[0].width, 406);
    }

    #[test]
    fn positive_tilt_keeps_first_slot() {
        let l = layout(SplitCount::Three, 10, 10.0);
        assert_eq!(l.slots[0].width, 426);
    }

    #[test]
    fn extreme_tilt_keeps_positive_slots() {
        for tilt in [-60.0, -45.0, 45.0, 60.0] {
            for width in [0, 10, 50, 200] {
                let l = layout(SplitCount::Three, width, tilt);
                for s in &l.slots {
                    assert!(s.width > 0);
                    assert!(s.cover_width > 0);
                }
            }
        }
    }

    #[test]
    fn cover_stops_at_canvas_edge_for_near_vertical_tilt() {
        for split in [SplitCount::Two, SplitCount::Three] {
            for tilt in [-89.9, -89.5, -60.0, -30.0, 0.0, 30.0, 60.0, 85.0, 89.5, 89.9] {
                for width in [0, 10, 100] {
                    let l = layout(split, width, tilt);
                    for s in &l.slots {
                        assert!(
                            s.cover_left + s.cover_width <= 1280 + 2 * width,
                            "split {split} tilt {tilt} width {width}: {s:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn tilted_cover_spans_the_seams() {
        let l = layout(SplitCount::Three, 10, 45.0);
        // Middle slot must reach from the first divider's top right edge
        // to the second divider's bottom left edge.
        let s = l.slots[1];
        assert_eq!(s.cover_left, 71);
        assert_eq!(s.cover_left + s.cover_width, 1208);
    }

    #[test]
    fn dividers_strictly_increase_at_both_edges() {
        for tilt in [-30.0, 0.0, 30.0] {
            let l = layout(SplitCount::Three, 20, tilt);
            let (a, b) = (l.dividers[0], l.dividers[1]);
            assert!(a.top_x + a.width as f64 <= b.top_x);
            assert!(a.bottom_x + a.width as f64 <= b.bottom_x);
        }
    }

    // =========================================================================
    // slot_row_span tests
    // =========================================================================

    #[test]
    fn row_spans_partition_each_row() {
        for tilt in [-40.0, 0.0, 25.0] {
            let l = layout(SplitCount::Three, 10, tilt);
            for y in [0, 100, 359, 719] {
                let spans: Vec<(u32, u32)> = (0..3).map(|i| l.slot_row_span(i, y)).collect();
                assert_eq!(spans[0].0, 0);
                assert_eq!(spans[0].1, spans[1].0);
                assert_eq!(spans[1].1, spans[2].0);
                assert_eq!(spans[2].1, CANVAS_WIDTH);
            }
        }
    }

    #[test]
    fn row_span_vertical_seam_at_centre() {
        let l = layout(SplitCount::Two, 10, 0.0);
        assert_eq!(l.slot_row_span(0, 0), (0, 640));
        assert_eq!(l.slot_row_span(1, 719), (640, 1280));
    }

    #[test]
    fn split_count_display_and_value() {
        assert_eq!(SplitCount::Three.get(), 3);
        assert_eq!(SplitCount::Two.to_string(), "2");
    }
}
