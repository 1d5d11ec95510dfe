//! Shared test utilities for the media-gallery test suite.
//!
//! Provides fixture builders for source trees (synthetic JPEGs, placeholder
//! videos, controlled modification times) and [`FakeExtractor`], an
//! in-memory [`FrameExtractor`] that records every request.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("A/x.jpg"), 400, 300);
//! touch(&tmp.path().join("A/clip.mp4"));
//!
//! let extractor = FakeExtractor::new(356, 200);
//! // ... run the pipeline ...
//! assert_eq!(extractor.calls().len(), 1);
//! ```

use crate::thumbs::{ExtractError, FrameExtractor, FrameRequest};
use image::{DynamicImage, ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, UNIX_EPOCH};

// =========================================================================
// Fixture files
// =========================================================================

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

/// Write a small valid JPEG with a gradient so re-encodes are non-trivial.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Set a file's modification time to `secs` after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

// =========================================================================
// Fake frame extractor
// =========================================================================

/// Frame extractor that returns a solid frame without touching the disk.
/// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
pub struct FakeExtractor {
    frame: Option<(u32, u32)>,
    calls: Mutex<Vec<FrameRequest>>,
}

impl FakeExtractor {
    /// Every request yields a `width`×`height` grey frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Some((width, height)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails the way a crashing decoder would.
    pub fn failing() -> Self {
        Self {
            frame: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<FrameRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl FrameExtractor for FakeExtractor {
    fn extract_frame(&self, request: &FrameRequest) -> Result<DynamicImage, ExtractError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.frame {
            Some((w, h)) => Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                w,
                h,
                image::Rgb([90, 120, 150]),
            ))),
            None => Err(ExtractError::Failed {
                path: request.source.clone(),
                stderr: "moov atom not found".into(),
            }),
        }
    }
}
