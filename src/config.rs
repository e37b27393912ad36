//! Configuration module.
//!
//! Handles loading, validating, and merging `thumbsplit.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `thumbsplit.toml` in the working directory is picked up automatically.
//! Pass `--config PATH` to use another file (which must then exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! simple_content_threshold = 0.5   # Normalized entropy (0-1) below which content is "simple"
//! similar_shape_threshold = 0.1    # Aspect-ratio variance below which shapes are "similar"
//!
//! [output]
//! directory = "YouTube-Thumbnails" # Where rendered thumbnails are written
//! compression = "lossless"         # "lossless" or "palette"
//! dither = true                    # Floyd-Steinberg dithering in palette mode
//! background = "#ffffff"           # Canvas color behind the images
//!
//! [optimize]
//! quality = 85                     # 1-100, sets the optimizer's palette size
//! min_savings_percent = 10.0       # Keep the optimized file only above this saving
//!
//! [processing]
//! max_processes = 4                # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{PngOptions, Quality, parse_hex_color};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "thumbsplit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `thumbsplit.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbConfig {
    /// Automatic split-count thresholds.
    pub layout: LayoutConfig,
    /// Where and how the thumbnail is written.
    pub output: OutputConfig,
    /// Output optimizer settings.
    pub optimize: OptimizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ThumbConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !unit(self.layout.simple_content_threshold) {
            return Err(ConfigError::Validation(
                "layout.simple_content_threshold must be 0-1".into(),
            ));
        }
        if !self.layout.similar_shape_threshold.is_finite()
            || self.layout.similar_shape_threshold < 0.0
        {
            return Err(ConfigError::Validation(
                "layout.similar_shape_threshold must be a non-negative number".into(),
            ));
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        self.output.background_color()?;
        if !(1..=100).contains(&self.optimize.quality) {
            return Err(ConfigError::Validation(
                "optimize.quality must be 1-100".into(),
            ));
        }
        let savings = self.optimize.min_savings_percent;
        if !savings.is_finite() || !(0.0..100.0).contains(&savings) {
            return Err(ConfigError::Validation(
                "optimize.min_savings_percent must be 0-100".into(),
            ));
        }
        Ok(())
    }

    /// PNG options for the primary encode of a render.
    pub fn png_options(&self, strip_metadata: bool) -> PngOptions {
        let options = match self.output.compression {
            CompressionMode::Lossless => PngOptions::lossless(),
            CompressionMode::Palette => PngOptions::palette(256, self.output.dither),
        };
        if strip_metadata {
            options.stripped()
        } else {
            options
        }
    }
}

/// Thresholds for the automatic 2-way vs 3-way decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Average normalized entropy (0-1) below which content counts as simple.
    pub simple_content_threshold: f64,
    /// Aspect-ratio variance below which images count as similarly shaped.
    pub similar_shape_threshold: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            simple_content_threshold: 0.5,
            similar_shape_threshold: 0.1,
        }
    }
}

/// Primary PNG encoding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Exact source colors, larger files.
    #[default]
    Lossless,
    /// Up to 256 colors, highest compression effort.
    Palette,
}

/// Output location and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory rendered thumbnails are written to.
    pub directory: PathBuf,
    pub compression: CompressionMode,
    /// Dither when `compression = "palette"`.
    pub dither: bool,
    /// Canvas background as a hex color.
    pub background: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("YouTube-Thumbnails"),
            compression: CompressionMode::Lossless,
            dither: true,
            background: "#ffffff".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn background_color(&self) -> Result<Rgba<u8>, ConfigError> {
        parse_hex_color(&self.background)
            .map_err(|e| ConfigError::Validation(format!("output.background: {e}")))
    }
}

/// Output optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Quality hint (1-100); sets the re-encode's palette size.
    pub quality: u32,
    /// The optimized file replaces the original only when it is smaller by
    /// more than this percentage.
    pub min_savings_percent: f64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            min_savings_percent: 10.0,
        }
    }
}

impl OptimizeConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ThumbConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// is not valid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ThumbConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ThumbConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<ThumbConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(path)?)
}

/// Load config from an explicitly named file, which must exist.
pub fn load_config_file(path: &Path) -> Result<ThumbConfig, ConfigError> {
    match load_raw_config(path)? {
        Some(overlay) => resolve_config(stock_defaults_value()?, Some(overlay)),
        None => Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        ))),
    }
}

/// Returns a fully-commented stock `thumbsplit.toml` with all keys.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbsplit configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# thumbsplit reads ./thumbsplit.toml when present, or the file named
# with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Automatic layout
# ---------------------------------------------------------------------------
# With --layout auto, three images are used only when the content is
# simple AND the shapes are similar; otherwise two larger slots win.
[layout]
# Average grayscale entropy, normalized to 0-1, below which content is
# considered simple.
simple_content_threshold = 0.5

# Variance of the images' width/height ratios below which they are
# considered similarly shaped.
similar_shape_threshold = 0.1

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory thumbnails are written to (created if missing).
directory = "YouTube-Thumbnails"

# "lossless": exact colors, larger files.
# "palette":  up to 256 colors with maximum compression effort.
compression = "lossless"

# Floyd-Steinberg dithering for palette compression.
dither = true

# Canvas color behind the images (#rgb, #rrggbb or #rrggbbaa).
background = "#ffffff"

# ---------------------------------------------------------------------------
# Output optimizer (--youtube-optimize)
# ---------------------------------------------------------------------------
[optimize]
# Quality hint 1-100. The optimizer re-encodes with round(256 * quality / 100)
# palette colors.
quality = 85

# The optimized file replaces the original only if it is smaller by more
# than this percentage.
min_savings_percent = 10.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for decoding and enhancing images.
# Omit to use all CPU cores. Values above the core count are clamped.
# max_processes = 4
"##
}
