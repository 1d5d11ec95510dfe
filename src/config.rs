//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. The file is
//! optional and read from the working directory; every key has a default,
//! and a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! public_dir = "public"     # Served directory; holds media/, thumbs/, data/
//! media_dir = "media"       # Originals (also the default source tree)
//! thumbs_dir = "thumbs"     # Thumbnails and video posters
//! data_dir = "data"         # Folder index documents
//!
//! [thumbnails]
//! height = 200              # Output height in pixels
//! quality = 80              # JPEG quality (1-100)
//!
//! [video]
//! frame_at_secs = 1.0       # Poster frame position
//! ffmpeg = "ffmpeg"         # Frame extractor binary
//!
//! [urls]
//! media = "/media"          # URL prefix for originals in index documents
//! thumbs = "/thumbs"        # URL prefix for thumbnails in index documents
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::index::UrlPrefixes;
use crate::prune::DerivedRoots;
use crate::thumbs::{Quality, ThumbSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub layout: LayoutConfig,
    pub thumbnails: ThumbnailsConfig,
    pub video: VideoConfig,
    pub urls: UrlsConfig,
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.height must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if !self.video.frame_at_secs.is_finite() || self.video.frame_at_secs < 0.0 {
            return Err(ConfigError::Validation(
                "video.frame_at_secs must be a non-negative number".into(),
            ));
        }
        if self.video.ffmpeg.trim().is_empty() {
            return Err(ConfigError::Validation("video.ffmpeg must not be empty".into()));
        }
        for (key, value) in [("urls.media", &self.urls.media), ("urls.thumbs", &self.urls.thumbs)] {
            if !value.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must start with '/'"
                )));
            }
        }
        Ok(())
    }

    /// Render settings for the thumbnail stage.
    pub fn thumb_spec(&self) -> ThumbSpec {
        ThumbSpec {
            height: self.thumbnails.height,
            quality: Quality::new(self.thumbnails.quality),
            frame_at_secs: self.video.frame_at_secs,
        }
    }

    /// URL prefixes for the index stage.
    pub fn url_prefixes(&self) -> UrlPrefixes {
        UrlPrefixes {
            media: self.urls.media.clone(),
            thumbs: self.urls.thumbs.clone(),
        }
    }
}

/// Conventional directory layout, used for CLI defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub public_dir: PathBuf,
    pub media_dir: String,
    pub thumbs_dir: String,
    pub data_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            media_dir: "media".into(),
            thumbs_dir: "thumbs".into(),
            data_dir: "data".into(),
        }
    }
}

impl LayoutConfig {
    /// Default source tree: `<public>/<media>`.
    pub fn source(&self) -> PathBuf {
        self.public_dir.join(&self.media_dir)
    }

    /// Default thumbnail root: `<public>/<thumbs>`.
    pub fn thumbs(&self) -> PathBuf {
        self.public_dir.join(&self.thumbs_dir)
    }

    /// The three derived roots under an explicit public directory.
    pub fn derived_roots(&self, public_dir: &Path) -> DerivedRoots {
        DerivedRoots {
            media: public_dir.join(&self.media_dir),
            thumbs: public_dir.join(&self.thumbs_dir),
            data: public_dir.join(&self.data_dir),
        }
    }
}

/// Thumbnail rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub height: u32,
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            height: 200,
            quality: 80,
        }
    }
}

/// Video poster settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub frame_at_secs: f64,
    pub ffmpeg: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frame_at_secs: 1.0,
            ffmpeg: "ffmpeg".into(),
        }
    }
}

/// URL prefixes written into index documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlsConfig {
    pub media: String,
    pub thumbs: String,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        let prefixes = UrlPrefixes::default();
        Self {
            media: prefixes.media,
            thumbs: prefixes.thumbs,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel thumbnail workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
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

/// Load `gallery.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load config from `gallery.toml` in `dir`, merged over stock defaults.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Media Gallery Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Directory layout (defaults for the positional CLI arguments)
# ---------------------------------------------------------------------------
[layout]
# Served directory holding the original media and every derived tree.
public_dir = "public"
# Originals, relative to public_dir. Also the default source tree.
media_dir = "media"
# Thumbnails and video posters, relative to public_dir.
thumbs_dir = "thumbs"
# Folder index documents, relative to public_dir.
data_dir = "data"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Output height in pixels. Width follows the source aspect ratio.
# Images shorter than this keep their size.
height = 200

# JPEG quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Video posters
# ---------------------------------------------------------------------------
[video]
# Seconds into the video at which the poster frame is taken.
frame_at_secs = 1.0

# ffmpeg binary used to extract the frame (name on PATH or absolute path).
ffmpeg = "ffmpeg"

# ---------------------------------------------------------------------------
# URLs written into index documents
# ---------------------------------------------------------------------------
[urls]
media = "/media"
thumbs = "/thumbs"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel thumbnail workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
