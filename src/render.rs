//! The render entry point: one [`RenderRequest`] in, one [`RenderResponse`] out.
//!
//! ```text
//! validate → select split → compute layout
//!          → ┬ per image (rayon): decode → [analyze → derive → enhance] → fit to slot
//!            └ per divider (rayon): render mask
//!          → composite → encode → atomic write → [optimize in place]
//! ```
//!
//! Fatal problems (bad request, unreadable required image, filesystem or
//! encode failure) abort the render and come back as
//! `RenderResponse { success: false, error }`. Enhancement, layout analysis
//! and optimization failures degrade with a warning instead.

use crate::config::{ConfigError, ThumbConfig};
use crate::imaging::rust_backend::has_supported_extension;
use crate::imaging::{
    BackendError, CANVAS_HEIGHT, CANVAS_WIDTH, EnhancementOptions, ImageBackend, Layout,
    RustBackend, Slot, SplitCount, analyze, composite, compute_layout, derive_params, divider,
    encode_png, enhance, parse_hex_color,
};
use crate::layout::{LayoutError, select_split_count};
use crate::naming::output_file_name;
use crate::optimize::optimize_file;
use crate::types::{RenderRequest, RenderResponse};
use chrono::{DateTime, Utc};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest tilt magnitude, exclusive; at 90° the divider is horizontal.
pub const MAX_TILT_DEGREES: f64 = 90.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid request: {0}")]
    InputValidation(String),
    /// `index` is the 0-based slot; the message numbers images from 1.
    #[error("Image {} ({}) could not be processed: {source}", index + 1, path.display())]
    ImageProcessing {
        index: usize,
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Encoding failed: {0}")]
    Encode(#[source] BackendError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<LayoutError> for RenderError {
    fn from(e: LayoutError) -> Self {
        RenderError::InputValidation(e.to_string())
    }
}

/// Render with the pure-Rust backend, naming defaults after the current time.
pub fn render(request: &RenderRequest, config: &ThumbConfig) -> RenderResponse {
    render_with_backend(&RustBackend::new(), request, config, Utc::now())
}

/// Render against an explicit backend and clock.
///
/// Never fails: errors are reported in the response.
pub fn render_with_backend(
    backend: &impl ImageBackend,
    request: &RenderRequest,
    config: &ThumbConfig,
    now: DateTime<Utc>,
) -> RenderResponse {
    match try_render(backend, request, config, now) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Render failed");
            RenderResponse::failure(e.to_string())
        }
    }
}

/// Request checks that need no image data. Returns the parsed divider color.
pub fn validate_request(request: &RenderRequest) -> Result<Rgba<u8>, RenderError> {
    let count = request.image_paths.len();
    if count < crate::layout::MIN_IMAGES {
        return Err(LayoutError::TooFewImages(count).into());
    }
    let tilt = request.divider_tilt;
    if !tilt.is_finite() || tilt.abs() >= MAX_TILT_DEGREES {
        return Err(RenderError::InputValidation(format!(
            "divider tilt must be strictly between -{MAX_TILT_DEGREES} and {MAX_TILT_DEGREES} degrees, got {tilt}"
        )));
    }
    for path in &request.image_paths {
        if !has_supported_extension(path) {
            warn!(path = %path.display(), "Unrecognized image extension, decoding by content");
        }
    }
    parse_hex_color(&request.divider_color)
        .map_err(|e| RenderError::InputValidation(format!("divider color: {e}")))
}

/// The divider must leave each slot at least as wide as two dividers.
pub fn check_divider_width(width: u32, split: SplitCount) -> Result<(), RenderError> {
    let max = CANVAS_WIDTH / split.get() as u32 / 2;
    if width > max {
        return Err(RenderError::InputValidation(format!(
            "divider width {width} exceeds {max} pixels for a {split}-way split"
        )));
    }
    Ok(())
}

fn try_render(
    backend: &impl ImageBackend,
    request: &RenderRequest,
    config: &ThumbConfig,
    now: DateTime<Utc>,
) -> Result<RenderResponse, RenderError> {
    let divider_color = validate_request(request)?;
    let background = config.output.background_color()?;

    let decision = select_split_count(
        backend,
        &request.image_paths,
        request.layout,
        &config.layout,
    )?;
    let split = decision.split;
    check_divider_width(request.divider_width, split)?;

    let layout = compute_layout(
        split,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        request.divider_width,
        request.divider_tilt,
    );
    debug!(
        split = split.get(),
        positions = ?layout.divider_positions(),
        widths = ?layout.slot_widths(),
        offsets = ?layout.slot_offsets(),
        "Computed layout"
    );

    let sources = &request.image_paths[..split.get()];
    let (placed, masks) = rayon::join(
        || prepare_images(backend, sources, &layout, request.enhance.as_ref()),
        || render_masks(&layout, divider_color),
    );
    let placed = placed?;

    let canvas = composite::composite(&layout, &placed, &masks, background);
    let bytes = encode_png(&canvas, &config.png_options(request.youtube_optimize))
        .map_err(RenderError::Encode)?;

    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    backend
        .ensure_dir(&output_dir)
        .map_err(|source| RenderError::Filesystem {
            path: output_dir.clone(),
            source,
        })?;
    let output_path = output_dir.join(output_file_name(request.output_name.as_deref(), now));
    backend
        .write_atomic(&output_path, &bytes)
        .map_err(|source| RenderError::Filesystem {
            path: output_path.clone(),
            source,
        })?;
    info!(path = %output_path.display(), bytes = bytes.len(), "Wrote thumbnail");

    let optimization_result = if request.youtube_optimize {
        match optimize_file(backend, &output_path, &canvas, &config.optimize) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "Optimization failed, keeping the unoptimized file");
                None
            }
        }
    } else {
        None
    };

    Ok(RenderResponse {
        success: true,
        output_path: Some(output_path),
        output_dir: Some(output_dir),
        split_count: Some(split.get()),
        optimization_result,
        error: None,
    })
}

/// Decode, optionally enhance, and fit every source to its slot in parallel.
fn prepare_images(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    layout: &Layout,
    enhance_options: Option<&EnhancementOptions>,
) -> Result<Vec<RgbaImage>, RenderError> {
    paths
        .par_iter()
        .zip(layout.slots.par_iter())
        .enumerate()
        .map(|(index, (path, slot))| {
            prepare_image(backend, index, path, slot, layout.canvas_height, enhance_options)
        })
        .collect()
}

fn prepare_image(
    backend: &impl ImageBackend,
    index: usize,
    path: &Path,
    slot: &Slot,
    canvas_height: u32,
    enhance_options: Option<&EnhancementOptions>,
) -> Result<RgbaImage, RenderError> {
    let processing_error = |source| RenderError::ImageProcessing {
        index,
        path: path.to_path_buf(),
        source,
    };

    let source = backend.decode(path).map_err(processing_error)?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(processing_error(BackendError::ProcessingFailed(format!(
            "image has no pixels ({width}x{height})"
        ))));
    }

    let upright = match enhance_options {
        None => source.oriented(),
        Some(options) => {
            let stats = analyze(&source.oriented(), false);
            let params = derive_params(&stats, options);
            debug!(index, ?params, "Derived enhancement parameters");
            enhance(&source, &params).unwrap_or_else(|e| {
                warn!(index, error = %e, "Enhancement failed, using the unenhanced image");
                source.oriented()
            })
        }
    };

    Ok(composite::fit_to_slot(&upright, slot, canvas_height))
}

fn render_masks(layout: &Layout, color: Rgba<u8>) -> Vec<RgbaImage> {
    layout
        .dividers
        .par_iter()
        .map(|d| divider::render_divider(d, layout.canvas_width, layout.canvas_height, color))
        .collect()
}
