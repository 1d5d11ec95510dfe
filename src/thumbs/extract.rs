//! Video frame extraction.
//!
//! The [`FrameExtractor`] trait is the one capability the thumbnail stage
//! needs from a video decoder: "give me a single frame of this file at this
//! timestamp, scaled to this height". Keeping it this narrow lets tests swap
//! in an in-memory fake, so the poster pipeline runs without real videos.
//!
//! The production implementation, [`FfmpegExtractor`], shells out to the
//! system `ffmpeg` and reads the frame back as a PNG on stdout:
//!
//! ```text
//! ffmpeg -hide_banner -loglevel error -ss 1 -i clip.mp4 \
//!        -frames:v 1 -vf scale=-2:200 -f image2pipe -vcodec png -
//! ```
//!
//! Nothing touches the poster path during extraction, so a failed or
//! interrupted run never leaves a half-made poster behind.

use super::params::FrameRequest;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("could not run {program}: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("frame extraction failed for {path}: {stderr}")]
    Failed { path: PathBuf, stderr: String },
    #[error("could not decode extracted frame for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Something that can pull a single scaled frame out of a video.
pub trait FrameExtractor: Sync {
    fn extract_frame(&self, request: &FrameRequest) -> Result<DynamicImage, ExtractError>;
}

/// [`FrameExtractor`] backed by an external `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: String,
}

impl FfmpegExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to ffmpeg for a request.
    pub fn args(request: &FrameRequest) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            format_seconds(request.at_secs),
            "-i".into(),
            request.source.to_string_lossy().into_owned(),
            "-frames:v".into(),
            "1".into(),
            "-vf".into(),
            format!("scale=-2:{}", request.height),
            "-f".into(),
            "image2pipe".into(),
            "-vcodec".into(),
            "png".into(),
            "-".into(),
        ]
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// `1.0` → `"1"`, `2.5` → `"2.5"`.
fn format_seconds(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{secs}")
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract_frame(&self, request: &FrameRequest) -> Result<DynamicImage, ExtractError> {
        let output = Command::new(&self.program)
            .args(Self::args(request))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExtractError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractError::Failed {
                path: request.source.clone(),
                stderr: if stderr.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        image::load_from_memory_with_format(&output.stdout, ImageFormat::Png).map_err(|source| {
            ExtractError::Decode {
                path: request.source.clone(),
                source,
            }
        })
    }
}
