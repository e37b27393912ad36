//! Pure Rust backend: decoders from the `image` crate, plain `std::fs` I/O.
//!
//! ## Operation mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | EXIF orientation | `image::ImageDecoder::orientation` |
//! | Atomic write | uniquely named sibling temp file + `std::fs::rename` |
//! | Stat | `std::fs::metadata` |

use super::backend::{BackendError, ImageBackend, SourceImage};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions that have decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True when the path's extension is one of [`supported_input_extensions`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an encoded image held in memory.
///
/// The format is sniffed from the content, so misnamed files still decode.
/// A missing or unreadable orientation tag means "upright".
pub fn decode_bytes(bytes: &[u8], label: &Path) -> Result<SourceImage, BackendError> {
    let decode_err = |e: image::ImageError| BackendError::Decode {
        path: label.display().to_string(),
        message: e.to_string(),
    };

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()
        .map_err(decode_err)?;
    let orientation = decoder.orientation().unwrap_or_else(|e| {
        warn!(path = %label.display(), error = %e, "Unreadable orientation tag, assuming upright");
        Orientation::NoTransforms
    });
    let pixels = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    Ok(SourceImage::new(pixels, orientation))
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling path used while an atomic write is in flight.
///
/// Unique per call, so concurrent writes to the same target in one process
/// never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<SourceImage, BackendError> {
        let bytes = std::fs::read(path)?;
        decode_bytes(&bytes, path)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), BackendError> {
        std::fs::create_dir_all(dir)?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
        let tmp = temp_path_for(path);
        let result = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
        if let Err(e) = result {
            // Never leave a half-written temp file behind
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        Ok(())
    }

    fn file_size(&self, path: &Path) -> Result<u64, BackendError> {
        Ok(std::fs::metadata(path)?.len())
    }
}
