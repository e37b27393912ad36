//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go through
//! `tracing` on stderr and never appear here.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Wrote YouTube-Thumbnails/cover.png
//!     Layout: 3-way split
//!     Optimized: 1.4 MB → 412.0 KB (71.3% smaller)
//! ```
//!
//! ## Analyze
//!
//! ```text
//! 001 sunset.jpg
//!     Aspect ratio: 1.78
//!     Brightness: 0.41  Contrast: 0.22  Saturation: 0.35
//!     Entropy: 7.21 bits (complexity 0.90)
//! 002 logo.png
//!     ...
//!
//! Average complexity: 0.62
//! Aspect variance: 0.0004
//! Layout: 2-way split (analysis)
//! ```

use crate::layout::{DecisionBasis, ImageComplexity, SplitDecision};
use crate::types::{OptimizationResult, RenderResponse};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count, binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Render output
// ============================================================================

fn format_optimization(result: &OptimizationResult) -> String {
    if result.optimized {
        format!(
            "Optimized: {} \u{2192} {} ({:.1}% smaller)",
            format_bytes(result.original_size),
            format_bytes(result.new_size),
            result.savings_percent
        )
    } else {
        format!(
            "Optimization skipped: not enough savings ({} kept)",
            format_bytes(result.original_size)
        )
    }
}

/// Format the outcome of a render.
pub fn format_render_response(response: &RenderResponse) -> Vec<String> {
    if !response.success {
        let reason = response.error.as_deref().unwrap_or("unknown error");
        return vec![format!("Render failed: {reason}")];
    }

    let mut lines = Vec::new();
    match &response.output_path {
        Some(path) => lines.push(format!("Wrote {}", path.display())),
        None => lines.push("Render succeeded".to_string()),
    }
    if let Some(split) = response.split_count {
        lines.push(format!("{}Layout: {split}-way split", indent(1)));
    }
    if let Some(result) = &response.optimization_result {
        lines.push(format!("{}{}", indent(1), format_optimization(result)));
    }
    lines
}

pub fn print_render_response(response: &RenderResponse) {
    for line in format_render_response(response) {
        println!("{}", line);
    }
}

// ============================================================================
// Analyze output
// ============================================================================

fn format_image(index: usize, path: &Path, image: &ImageComplexity) -> Vec<String> {
    let stats = &image.stats;
    let mut lines = vec![
        format!("{} {}", format_index(index), file_label(path)),
        format!("{}Aspect ratio: {:.2}", indent(1), image.aspect_ratio),
        format!(
            "{}Brightness: {:.2}  Contrast: {:.2}  Saturation: {:.2}",
            indent(1),
            stats.brightness(),
            stats.contrast(),
            stats.saturation
        ),
    ];
    if let Some(entropy) = stats.entropy {
        lines.push(format!(
            "{}Entropy: {:.2} bits (complexity {:.2})",
            indent(1),
            entropy,
            image.complexity
        ));
    }
    lines
}

fn basis_label(basis: DecisionBasis) -> &'static str {
    match basis {
        DecisionBasis::Forced => "forced",
        DecisionBasis::Analysis => "analysis",
        DecisionBasis::Fallback => "fallback after failed analysis",
    }
}

/// Format per-image statistics and the automatic split decision.
///
/// `paths` are the analyzed inputs; only as many as the decision measured
/// get a statistics block.
pub fn format_analysis(paths: &[impl AsRef<Path>], decision: &SplitDecision) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (path, image)) in paths.iter().zip(&decision.images).enumerate() {
        lines.extend(format_image(i + 1, path.as_ref(), image));
    }
    let skipped = paths.len().saturating_sub(decision.images.len());
    if skipped > 0 && !decision.images.is_empty() {
        lines.push(format!(
            "{}({skipped} more not considered for layout)",
            indent(1)
        ));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }

    if let Some(average) = decision.average_complexity {
        lines.push(format!("Average complexity: {average:.2}"));
    }
    if let Some(variance) = decision.aspect_variance {
        lines.push(format!("Aspect variance: {variance:.4}"));
    }
    let mut layout = format!(
        "Layout: {}-way split ({})",
        decision.split,
        basis_label(decision.basis)
    );
    if decision.clamped {
        layout.push_str(", limited by image count");
    }
    lines.push(layout);
    lines
}

pub fn print_analysis(paths: &[impl AsRef<Path>], decision: &SplitDecision) {
    for line in format_analysis(paths, decision) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::statistics::ChannelStats;
    use crate::imaging::{ImageStatistics, SplitCount};
    use std::path::PathBuf;

    fn channel(mean: f64) -> ChannelStats {
        ChannelStats {
            mean,
            stdev: 40.0,
            min: 0,
            max: 255,
        }
    }

    fn complexity(entropy: f64, aspect_ratio: f64) -> ImageComplexity {
        ImageComplexity::from_stats(ImageStatistics {
            red: channel(128.0),
            green: channel(128.0),
            blue: channel(128.0),
            saturation: 0.25,
            entropy: Some(entropy),
            aspect_ratio,
        })
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    // =========================================================================
    // Render output tests
    // =========================================================================

    #[test]
    fn successful_render_lines() {
        let response = RenderResponse {
            success: true,
            output_path: Some(PathBuf::from("out/cover.png")),
            output_dir: Some(PathBuf::from("out")),
            split_count: Some(3),
            optimization_result: None,
            error: None,
        };
        assert_eq!(
            format_render_response(&response),
            vec!["Wrote out/cover.png", "    Layout: 3-way split"]
        );
    }

    #[test]
    fn optimized_render_shows_savings() {
        let response = RenderResponse {
            success: true,
            output_path: Some(PathBuf::from("out/cover.png")),
            split_count: Some(2),
            optimization_result: Some(OptimizationResult {
                original_size: 2048,
                new_size: 1024,
                savings_percent: 50.0,
                optimized: true,
            }),
            ..RenderResponse::default()
        };
        let lines = format_render_response(&response);
        assert_eq!(lines[2], "    Optimized: 2.0 KB \u{2192} 1.0 KB (50.0% smaller)");
    }

    #[test]
    fn skipped_optimization_is_explained() {
        let response = RenderResponse {
            success: true,
            optimization_result: Some(OptimizationResult::unchanged(4096)),
            ..RenderResponse::default()
        };
        let lines = format_render_response(&response);
        assert_eq!(
            lines.last().unwrap(),
            "    Optimization skipped: not enough savings (4.0 KB kept)"
        );
    }

    #[test]
    fn failed_render_single_line() {
        let response = RenderResponse::failure("Invalid request: nope");
        assert_eq!(
            format_render_response(&response),
            vec!["Render failed: Invalid request: nope"]
        );
    }

    // =========================================================================
    // Analyze output tests
    // =========================================================================

    #[test]
    fn analysis_lists_images_and_decision() {
        let decision = SplitDecision {
            split: SplitCount::Two,
            basis: DecisionBasis::Analysis,
            clamped: false,
            images: vec![complexity(7.2, 1.78), complexity(6.4, 1.0)],
            average_complexity: Some(0.85),
            aspect_variance: Some(0.1521),
        };
        let paths = [PathBuf::from("/photos/a.jpg"), PathBuf::from("b.png")];
        let lines = format_analysis(&paths, &decision);

        assert_eq!(lines[0], "001 a.jpg");
        assert_eq!(lines[1], "    Aspect ratio: 1.78");
        assert_eq!(
            lines[2],
            "    Brightness: 0.50  Contrast: 0.16  Saturation: 0.25"
        );
        assert_eq!(lines[3], "    Entropy: 7.20 bits (complexity 0.90)");
        assert_eq!(lines[4], "002 b.png");
        assert!(lines.contains(&"Average complexity: 0.85".to_string()));
        assert!(lines.contains(&"Aspect variance: 0.1521".to_string()));
        assert_eq!(lines.last().unwrap(), "Layout: 2-way split (analysis)");
    }

    #[test]
    fn analysis_notes_unconsidered_images() {
        let decision = SplitDecision {
            split: SplitCount::Three,
            basis: DecisionBasis::Analysis,
            clamped: false,
            images: vec![complexity(1.0, 1.0); 3],
            average_complexity: Some(0.125),
            aspect_variance: Some(0.0),
        };
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        let lines = format_analysis(&paths, &decision);
        assert!(lines.contains(&"    (2 more not considered for layout)".to_string()));
    }

    #[test]
    fn fallback_analysis_has_only_decision() {
        let decision = SplitDecision {
            split: SplitCount::Two,
            basis: DecisionBasis::Fallback,
            clamped: true,
            images: Vec::new(),
            average_complexity: None,
            aspect_variance: None,
        };
        let paths = [PathBuf::from("a.png"), PathBuf::from("b.png")];
        assert_eq!(
            format_analysis(&paths, &decision),
            vec!["Layout: 2-way split (fallback after failed analysis), limited by image count"]
        );
    }
}
