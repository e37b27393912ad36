//! Request and response types for the render entry point.
//!
//! Both sides serialize to JSON: the binary prints a [`RenderResponse`] with
//! `--json`, and library callers may build a [`RenderRequest`] from a JSON or
//! TOML document, leaving out any field that should take its default.

use crate::imaging::SplitCount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use crate::imaging::{EnhancementLevel, EnhancementOptions, Multipliers};

/// How the split count is chosen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum LayoutMode {
    /// Decide from image complexity and shape.
    #[default]
    #[serde(rename = "auto")]
    #[value(name = "auto")]
    Auto,
    #[serde(rename = "2")]
    #[value(name = "2")]
    Two,
    #[serde(rename = "3")]
    #[value(name = "3")]
    Three,
}

impl LayoutMode {
    /// The forced split count, or `None` in automatic mode.
    pub fn forced(self) -> Option<SplitCount> {
        match self {
            LayoutMode::Auto => None,
            LayoutMode::Two => Some(SplitCount::Two),
            LayoutMode::Three => Some(SplitCount::Three),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Auto => write!(f, "auto"),
            LayoutMode::Two => write!(f, "2"),
            LayoutMode::Three => write!(f, "3"),
        }
    }
}

/// Everything one render needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderRequest {
    /// Source images in slot order; only the first `split_count` are used.
    pub image_paths: Vec<PathBuf>,
    /// Divider band width in pixels.
    pub divider_width: u32,
    /// Divider tilt in degrees; positive leans right going down.
    pub divider_tilt: f64,
    /// Divider fill as a hex color.
    pub divider_color: String,
    pub layout: LayoutMode,
    /// `None` disables enhancement entirely.
    pub enhance: Option<EnhancementOptions>,
    /// Output file name; a timestamped name is used when absent.
    pub output_name: Option<String>,
    /// Output directory; the configured directory is used when absent.
    pub output_dir: Option<PathBuf>,
    /// Strip metadata and run the output optimizer.
    pub youtube_optimize: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            image_paths: Vec::new(),
            divider_width: 10,
            divider_tilt: 0.0,
            divider_color: "#ffffff".to_string(),
            layout: LayoutMode::Auto,
            enhance: None,
            output_name: None,
            output_dir: None,
            youtube_optimize: false,
        }
    }
}

impl RenderRequest {
    pub fn new(image_paths: Vec<PathBuf>) -> Self {
        Self {
            image_paths,
            ..Self::default()
        }
    }
}

/// Outcome of the output optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub original_size: u64,
    /// Size of the file kept on disk; equals `original_size` when the
    /// optimized variant was discarded.
    pub new_size: u64,
    pub savings_percent: f64,
    /// Whether the optimized variant replaced the original.
    pub optimized: bool,
}

impl OptimizationResult {
    /// The original was kept as-is.
    pub fn unchanged(original_size: u64) -> Self {
        Self {
            original_size,
            new_size: original_size,
            savings_percent: 0.0,
            optimized: false,
        }
    }
}

/// Result of one render. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_result: Option<OptimizationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}
