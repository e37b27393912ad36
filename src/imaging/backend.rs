//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the collaborators the render pipeline
//! needs from the outside world: decode a source file, make sure the output
//! directory exists, write a file atomically, and stat a written file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust decoders from
//! the `image` crate and plain `std::fs`. Tests use the recording
//! [`MockBackend`](tests::MockBackend), which serves in-memory images.

use image::DynamicImage;
use image::metadata::Orientation;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A decoded source photo plus its EXIF orientation.
///
/// Never mutated: enhancement, orientation and resizing all produce new
/// buffers.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
    orientation: Orientation,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, orientation: Orientation) -> Self {
        Self {
            pixels,
            orientation,
        }
    }

    /// Stored pixels, before orientation is applied.
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Stored dimensions, before orientation is applied.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixels.width(), self.pixels.height())
    }

    /// A copy of the pixels rotated/flipped upright.
    pub fn oriented(&self) -> DynamicImage {
        let mut upright = self.pixels.clone();
        upright.apply_orientation(self.orientation);
        upright
    }
}

/// Trait for image I/O backends.
///
/// `Sync` so per-image work can fan out with rayon's `par_iter`.
pub trait ImageBackend: Sync {
    /// Read and decode an image, including its orientation metadata.
    fn decode(&self, path: &Path) -> Result<SourceImage, BackendError>;

    /// Create a directory (and parents) if it does not exist.
    fn ensure_dir(&self, dir: &Path) -> Result<(), BackendError>;

    /// Replace `path` with `bytes` so readers never observe a partial file.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), BackendError>;

    /// Size of a written file in bytes.
    fn file_size(&self, path: &Path) -> Result<u64, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock backend serving in-memory images and recording every operation.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub images: Mutex<HashMap<PathBuf, DynamicImage>>,
        pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
        pub failing_writes: Mutex<HashSet<PathBuf>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        EnsureDir(String),
        Write { path: String, len: usize },
        FileSize(String),
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `images[i]` at path `"/in/{i}.png"`.
        pub fn with_images(images: Vec<DynamicImage>) -> Self {
            let backend = Self::new();
            for (i, img) in images.into_iter().enumerate() {
                backend.add_image(format!("/in/{i}.png"), img);
            }
            backend
        }

        pub fn add_image(&self, path: impl Into<PathBuf>, image: DynamicImage) {
            self.images.lock().unwrap().insert(path.into(), image);
        }

        pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
            self.failing_writes.lock().unwrap().insert(path.into());
        }

        pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<SourceImage, BackendError> {
            self.record(RecordedOp::Decode(path.to_string_lossy().to_string()));
            self.images
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .map(|img| SourceImage::new(img, Orientation::NoTransforms))
                .ok_or_else(|| BackendError::Decode {
                    path: path.display().to_string(),
                    message: "no mock image".to_string(),
                })
        }

        fn ensure_dir(&self, dir: &Path) -> Result<(), BackendError> {
            self.record(RecordedOp::EnsureDir(dir.to_string_lossy().to_string()));
            Ok(())
        }

        fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
            self.record(RecordedOp::Write {
                path: path.to_string_lossy().to_string(),
                len: bytes.len(),
            });
            if self.failing_writes.lock().unwrap().contains(path) {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock write failure",
                )));
            }
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), bytes.to_vec());
            Ok(())
        }

        fn file_size(&self, path: &Path) -> Result<u64, BackendError> {
            self.record(RecordedOp::FileSize(path.to_string_lossy().to_string()));
            self.files
                .lock()
                .unwrap()
                .get(path)
                .map(|b| b.len() as u64)
                .ok_or_else(|| {
                    BackendError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no mock file",
                    ))
                })
        }
    }

    #[test]
    fn mock_serves_registered_images() {
        let backend = MockBackend::with_images(vec![DynamicImage::new_rgb8(8, 6)]);

        let img = backend.decode(Path::new("/in/0.png")).unwrap();
        assert_eq!(img.dimensions(), (8, 6));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/in/0.png"));
    }

    #[test]
    fn mock_decode_unknown_path_errors() {
        let backend = MockBackend::new();
        let result = backend.decode(Path::new("/missing.jpg"));
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn mock_records_writes_and_sizes() {
        let backend = MockBackend::new();
        backend
            .write_atomic(Path::new("/out/a.png"), &[1, 2, 3])
            .unwrap();

        assert_eq!(backend.file_size(Path::new("/out/a.png")).unwrap(), 3);
        assert_eq!(backend.file("/out/a.png"), Some(vec![1, 2, 3]));
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Write { len: 3, .. }
        ));
    }

    #[test]
    fn mock_write_failure() {
        let backend = MockBackend::new();
        backend.fail_writes_to("/out/a.png");
        assert!(backend.write_atomic(Path::new("/out/a.png"), &[1]).is_err());
        assert_eq!(backend.file("/out/a.png"), None);
    }

    #[test]
    fn oriented_applies_rotation() {
        let img = SourceImage::new(DynamicImage::new_rgb8(5, 3), Orientation::Rotate270);
        assert_eq!(img.dimensions(), (5, 3));
        let upright = img.oriented();
        assert_eq!((upright.width(), upright.height()), (3, 5));
    }
}
