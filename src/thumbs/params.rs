//! Parameter types for thumbnail operations.
//!
//! - [`Quality`]: JPEG encoding quality (1–100). Clamped on construction.
//! - [`ThumbSpec`]: target height and quality shared by image thumbnails and
//!   video posters.
//! - [`FrameRequest`]: what the frame extractor is asked to produce.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// How every thumbnail and poster is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbSpec {
    /// Output height in pixels; width follows the source aspect ratio.
    pub height: u32,
    pub quality: Quality,
    /// Seek position for video posters, in seconds.
    pub frame_at_secs: f64,
}

impl Default for ThumbSpec {
    fn default() -> Self {
        Self {
            height: 200,
            quality: Quality::default(),
            frame_at_secs: 1.0,
        }
    }
}

/// A single-frame extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    pub source: PathBuf,
    pub at_secs: f64,
    pub height: u32,
}
