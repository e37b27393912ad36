//! Output optimizer.
//!
//! Re-encodes an already-composited canvas as a stripped, undithered
//! palette PNG sized from the quality hint, and keeps it only when it beats
//! the original by more than the configured margin. The replacement goes
//! through [`ImageBackend::write_atomic`], so readers see either the old
//! file or the new one.
//!
//! The optimizer never reports a kept file larger than the original: when
//! the re-encode loses, `new_size == original_size` and savings are zero.

use crate::config::OptimizeConfig;
use crate::imaging::{BackendError, ImageBackend, PngOptions, encode_png};
use crate::types::OptimizationResult;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Optimizer failure. Non-fatal: the render keeps the unoptimized file.
#[derive(Error, Debug)]
pub enum OptimizationError {
    #[error("failed to re-encode: {0}")]
    Encode(#[source] BackendError),
    #[error("failed to read size of {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("failed to replace {}: {source}", path.display())]
    Replace {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Outcome of an in-memory optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    /// The re-encoded file, present only when it should replace the original.
    pub bytes: Option<Vec<u8>>,
    pub result: OptimizationResult,
}

/// Encoder settings used for the optimized variant.
pub fn optimizer_options(config: &OptimizeConfig) -> PngOptions {
    PngOptions::palette(config.quality().palette_colors(), false).stripped()
}

/// Percentage saved going from `original` to `new` bytes.
pub fn savings_percent(original: u64, new: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - new as f64) / original as f64 * 100.0
}

/// Re-encode `raster` and compare against an original of `original_size` bytes.
pub fn optimize(
    raster: &RgbaImage,
    original_size: u64,
    config: &OptimizeConfig,
) -> Result<Optimized, OptimizationError> {
    let bytes =
        encode_png(raster, &optimizer_options(config)).map_err(OptimizationError::Encode)?;
    let new_size = bytes.len() as u64;
    let savings = savings_percent(original_size, new_size);

    debug!(
        original_size,
        candidate_size = new_size,
        savings_percent = savings,
        "Optimizer candidate"
    );

    if new_size < original_size && savings > config.min_savings_percent {
        Ok(Optimized {
            bytes: Some(bytes),
            result: OptimizationResult {
                original_size,
                new_size,
                savings_percent: savings,
                optimized: true,
            },
        })
    } else {
        Ok(Optimized {
            bytes: None,
            result: OptimizationResult::unchanged(original_size),
        })
    }
}

/// Optimize the file already written at `path` in place.
pub fn optimize_file(
    backend: &impl ImageBackend,
    path: &Path,
    raster: &RgbaImage,
    config: &OptimizeConfig,
) -> Result<OptimizationResult, OptimizationError> {
    let original_size = backend
        .file_size(path)
        .map_err(|source| OptimizationError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

    let optimized = optimize(raster, original_size, config)?;
    if let Some(bytes) = &optimized.bytes {
        backend
            .write_atomic(path, bytes)
            .map_err(|source| OptimizationError::Replace {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(optimized.result)
}
