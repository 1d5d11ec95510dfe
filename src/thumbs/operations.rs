//! High-level thumbnail operations.
//!
//! These functions combine the dimension math with decoding, the frame
//! extractor, the overlay and the JPEG encoder. They never consult the
//! signature store; staleness is decided by the caller.

use super::ThumbError;
use super::calculations::{even_width_for_height, fit_height};
use super::extract::FrameExtractor;
use super::overlay::composite_play_glyph;
use super::params::{FrameRequest, Quality, ThumbSpec};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Decode `source` and scale it to the spec height (never enlarging).
pub fn render_image_thumbnail(source: &Path, spec: &ThumbSpec) -> Result<DynamicImage, ThumbError> {
    let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
    let (w, h) = fit_height(img.dimensions(), spec.height);
    if (w, h) == img.dimensions() {
        Ok(img)
    } else {
        Ok(img.resize_exact(w, h, FilterType::Lanczos3))
    }
}

/// Pull a frame out of `source` and stamp the play glyph onto it.
pub fn render_video_poster(
    extractor: &impl FrameExtractor,
    source: &Path,
    spec: &ThumbSpec,
) -> Result<DynamicImage, ThumbError> {
    let frame = extractor.extract_frame(&FrameRequest {
        source: source.to_path_buf(),
        at_secs: spec.frame_at_secs,
        height: spec.height,
    })?;
    let frame = if frame.height() == spec.height {
        frame
    } else {
        let width = even_width_for_height(frame.dimensions(), spec.height);
        frame.resize_exact(width, spec.height, FilterType::Lanczos3)
    };
    Ok(composite_play_glyph(&frame))
}

/// Encode `img` as JPEG into a uniquely named temp file next to `dest`, then
/// rename it over `dest`. Readers see either the old file or the complete new
/// one, even when several sources render to the same `dest` at once.
pub fn write_jpeg_atomic(img: &DynamicImage, dest: &Path, quality: Quality) -> Result<(), ThumbError> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    // Hidden name, so a crash leftover is ignored by scan and prune alike.
    let mut tmp = NamedTempFile::new_in(parent)?;
    encode_jpeg(img, &mut tmp, quality)?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

fn encode_jpeg(img: &DynamicImage, out: &mut impl Write, quality: Quality) -> Result<(), ThumbError> {
    let mut writer = BufWriter::new(out);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value());
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}
