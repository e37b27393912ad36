//! Output file naming.
//!
//! Every render writes one PNG. Its name is either the caller's choice,
//! sanitized into a single safe path component, or a UTC timestamp:
//!
//! - `None` → `youtube-thumbnail-2026-03-01T09-15-42.png`
//! - `"My Video: Part 2"` → `My Video- Part 2.png`
//! - `"cover.png"` → `cover.png` (extension not doubled)
//! - `"../../etc/x"` → `-..-etc-x.png`

use chrono::{DateTime, Utc};

/// Prefix of generated names.
pub const DEFAULT_PREFIX: &str = "youtube-thumbnail";

const EXTENSION: &str = ".png";

/// Timestamped stem, e.g. `youtube-thumbnail-2026-03-01T09-15-42`.
///
/// Colons are replaced so the name is valid on every filesystem.
pub fn default_stem(now: DateTime<Utc>) -> String {
    format!("{DEFAULT_PREFIX}-{}", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Turn an arbitrary string into a single path component.
///
/// Path separators, reserved characters and control characters become `-`;
/// surrounding whitespace and leading dots are removed.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    replaced.trim_start_matches('.').trim().to_string()
}

/// The final file name for a render.
pub fn output_file_name(requested: Option<&str>, now: DateTime<Utc>) -> String {
    let stem = requested
        .map(|name| sanitize_name(strip_png_extension(name.trim())))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| default_stem(now));
    format!("{stem}{EXTENSION}")
}

fn strip_png_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(EXTENSION.len());
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(EXTENSION) => stem,
        _ => name,
    }
}
