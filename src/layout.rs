//! Layout selection: 2-way or 3-way split.
//!
//! A forced [`LayoutMode`] is honored as-is. In automatic mode the first
//! (up to) three images are analyzed and three slots are chosen only when
//! the content is simple **and** the shapes are similar:
//!
//! ```text
//! complexity      = grayscale entropy / 8          (0–1 per image)
//! aspect variance = population variance of width/height ratios
//!
//! 3 if mean(complexity) < simple_content_threshold
//!   && aspect variance < similar_shape_threshold
//! 2 otherwise
//! ```
//!
//! The result never exceeds the number of images supplied. Analysis is
//! best-effort: if any image cannot be read, the selector falls back to a
//! 3-way split (again capped by the image count).

use crate::config::LayoutConfig;
use crate::imaging::{BackendError, ImageBackend, ImageStatistics, SplitCount, analyze};
use crate::types::LayoutMode;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// A render needs at least this many images.
pub const MIN_IMAGES: usize = 2;

/// Image count problems. Fatal: the render aborts before any processing.
#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("at least 2 images are required, got {0}")]
    TooFewImages(usize),
    #[error("layout {mode} needs {mode} images, got {got}")]
    NotEnoughForForced { mode: LayoutMode, got: usize },
}

/// Complexity analysis failure. Non-fatal: the selector falls back.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("image {index} ({}) could not be analyzed: {source}", path.display())]
    Read {
        index: usize,
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Per-image inputs to the automatic decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageComplexity {
    /// Normalized grayscale entropy, 0–1.
    pub complexity: f64,
    pub aspect_ratio: f64,
    pub stats: ImageStatistics,
}

impl ImageComplexity {
    pub fn from_stats(stats: ImageStatistics) -> Self {
        Self {
            complexity: stats.entropy.unwrap_or(0.0) / 8.0,
            aspect_ratio: stats.aspect_ratio,
            stats,
        }
    }
}

/// How the split count was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionBasis {
    Forced,
    Analysis,
    /// Analysis failed; the 3-way default was used.
    Fallback,
}

/// The selected split count plus the numbers behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDecision {
    pub split: SplitCount,
    pub basis: DecisionBasis,
    /// Analysis suggested more slots than there are images.
    pub clamped: bool,
    pub images: Vec<ImageComplexity>,
    pub average_complexity: Option<f64>,
    pub aspect_variance: Option<f64>,
}

impl SplitDecision {
    fn forced(split: SplitCount) -> Self {
        Self {
            split,
            basis: DecisionBasis::Forced,
            clamped: false,
            images: Vec::new(),
            average_complexity: None,
            aspect_variance: None,
        }
    }
}

/// Population variance; zero for fewer than two values.
pub fn aspect_variance(ratios: &[f64]) -> f64 {
    if ratios.len() < 2 {
        return 0.0;
    }
    let n = ratios.len() as f64;
    let mean = ratios.iter().sum::<f64>() / n;
    ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
}

/// Pure decision rule on already-measured inputs.
pub fn choose_split_count(
    complexities: &[f64],
    aspect_ratios: &[f64],
    thresholds: &LayoutConfig,
) -> SplitCount {
    if complexities.is_empty() {
        return SplitCount::Three;
    }
    let average = complexities.iter().sum::<f64>() / complexities.len() as f64;
    if average < thresholds.simple_content_threshold
        && aspect_variance(aspect_ratios) < thresholds.similar_shape_threshold
    {
        SplitCount::Three
    } else {
        SplitCount::Two
    }
}

/// Never use more slots than there are images.
fn clamp_to_available(split: SplitCount, available: usize) -> (SplitCount, bool) {
    if split.get() > available {
        (SplitCount::Two, true)
    } else {
        (split, false)
    }
}

/// Decode and measure images (upright, entropy included) in parallel.
pub fn analyze_images(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
) -> Result<Vec<ImageComplexity>, AnalysisError> {
    paths
        .par_iter()
        .enumerate()
        .map(|(index, path)| analyze_one(backend, index, path))
        .collect()
}

fn analyze_one(
    backend: &impl ImageBackend,
    index: usize,
    path: &Path,
) -> Result<ImageComplexity, AnalysisError> {
    let source = backend.decode(path).map_err(|source| AnalysisError::Read {
        index,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ImageComplexity::from_stats(analyze(&source.oriented(), true)))
}

/// Decide the split count for a render.
///
/// Fails only on image-count problems; analysis failures fall back to a
/// 3-way split.
pub fn select_split_count(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    mode: LayoutMode,
    thresholds: &LayoutConfig,
) -> Result<SplitDecision, LayoutError> {
    if paths.len() < MIN_IMAGES {
        return Err(LayoutError::TooFewImages(paths.len()));
    }

    if let Some(split) = mode.forced() {
        if paths.len() < split.get() {
            return Err(LayoutError::NotEnoughForForced {
                mode,
                got: paths.len(),
            });
        }
        return Ok(SplitDecision::forced(split));
    }

    let candidates = &paths[..paths.len().min(SplitCount::Three.get())];
    let decision = match analyze_images(backend, candidates) {
        Ok(images) => {
            let complexities: Vec<f64> = images.iter().map(|i| i.complexity).collect();
            let ratios: Vec<f64> = images.iter().map(|i| i.aspect_ratio).collect();
            let suggested = choose_split_count(&complexities, &ratios, thresholds);
            let (split, clamped) = clamp_to_available(suggested, paths.len());
            SplitDecision {
                split,
                basis: DecisionBasis::Analysis,
                clamped,
                average_complexity: Some(
                    complexities.iter().sum::<f64>() / complexities.len() as f64,
                ),
                aspect_variance: Some(aspect_variance(&ratios)),
                images,
            }
        }
        Err(e) => {
            warn!(error = %e, "Layout analysis failed, falling back to 3-way split");
            let (split, clamped) = clamp_to_available(SplitCount::Three, paths.len());
            SplitDecision {
                split,
                basis: DecisionBasis::Fallback,
                clamped,
                images: Vec::new(),
                average_complexity: None,
                aspect_variance: None,
            }
        }
    };

    debug!(
        split = decision.split.get(),
        basis = ?decision.basis,
        complexity = ?decision.average_complexity,
        variance = ?decision.aspect_variance,
        "Selected split count"
    );
    Ok(decision)
}
