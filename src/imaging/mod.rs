//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode + orientation** | `image::ImageReader`, `ImageDecoder::orientation` |
//! | **Statistics** | single pass over RGB8 pixels |
//! | **Enhance** | LUTs, `imageops::huerotate`, `imageops::blur` (unsharp mask) |
//! | **Slot fill** | `resize_to_fill` with Lanczos3 |
//! | **Dividers** | scanline parallelogram fill + `imageops::overlay` |
//! | **Encode** | `png` crate; median-cut palette + `imageops::dither` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for divider and slot geometry (unit testable)
//! - **Parameters**: Data structures describing enhancement and encoding
//! - **Statistics / Adaptive**: Image analysis and the rules deriving parameters from it
//! - **Enhance / Divider / Composite / Encode**: Pixel work, one stage per module
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod adaptive;
pub mod backend;
mod calculations;
pub mod composite;
pub mod divider;
pub mod encode;
pub mod enhance;
pub mod palette;
mod params;
pub mod rust_backend;
pub mod statistics;

pub use adaptive::{EnhancementLevel, EnhancementOptions, Multipliers, derive_params};
pub use backend::{BackendError, ImageBackend, SourceImage};
pub use calculations::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Divider, Layout, Slot, SplitCount, compute_layout,
    tilt_displacement,
};
pub use encode::encode_png;
pub use enhance::{EnhanceError, enhance};
pub use params::{
    EnhancementParams, LinearTransform, PercentileClip, PngMode, PngOptions, Quality,
    SharpenKernel, parse_hex_color,
};
pub use rust_backend::RustBackend;
pub use statistics::{ImageStatistics, analyze};
