//! # thumbsplit
//!
//! Composes a 1280×720 YouTube thumbnail from two or three source images,
//! placed side by side and separated by solid, optionally tilted dividers.
//!
//! # Architecture: One Request, One Pipeline
//!
//! Every render is a single call, [`render::render`], taking a
//! [`types::RenderRequest`] and returning a [`types::RenderResponse`]:
//!
//! ```text
//! 1. Validate   request            →  divider color, image count, tilt, width
//! 2. Select     first ≤3 images    →  split count (forced, or entropy + shape)
//! 3. Layout     split, width, tilt →  divider positions, slot widths/offsets
//! 4. Prepare    each image         →  decode, orient, enhance, cover-fit
//! 5. Compose    images + dividers  →  canvas → PNG → atomic write
//! 6. Optimize   (optional)         →  palette re-encode, kept only if smaller
//! ```
//!
//! Steps 3 and the divider half of 5 are pure geometry, so most of the
//! pipeline is tested without decoding a single file. Disk access goes
//! through [`imaging::ImageBackend`], which tests replace with a recording
//! mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`render`] | The entry point: validation, orchestration, error reporting |
//! | [`layout`] | Automatic 2-way vs 3-way decision from image complexity and shape |
//! | [`optimize`] | Palette re-encode of the finished thumbnail, kept only when it saves enough |
//! | [`imaging`] | Geometry, statistics, enhancement, compositing, PNG encoding, backends |
//! | [`config`] | `thumbsplit.toml` loading, stock defaults, sparse overrides, validation |
//! | [`types`] | Request/response types shared by the library and the CLI |
//! | [`naming`] | Timestamped default names and output-name sanitization |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Canvas
//!
//! The canvas is always 1280×720, the size YouTube recommends. Sources are
//! scaled to cover their slot and center-cropped, never letterboxed.
//!
//! ## Failures Are Responses
//!
//! The render entry point never returns `Err`. Fatal problems come back as
//! `success: false` with a message; recoverable ones (enhancement, layout
//! analysis, optimization) log a warning and degrade to the plain result.
//! A render either writes a complete file or writes nothing.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and compositing use the `image` crate;
//! PNG output goes through the `png` crate directly so that palette images
//! are written as true indexed PNGs. No system libraries are needed.

pub mod config;
pub mod imaging;
pub mod layout;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
