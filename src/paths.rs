//! Centralized path and URL conventions shared by every stage.
//!
//! All derived artifacts mirror the source tree. A source file at
//! `<source>/Trips/2019/beach.mp4` produces:
//!
//! ```text
//! relative path:   Trips/2019/beach.mp4
//! media URL:       /media/Trips/2019/beach.mp4
//! thumbnail path:  <thumbs>/Trips/2019/beach.jpg
//! thumbnail URL:   /thumbs/Trips/2019/beach.jpg
//! stem:            trips/2019/beach          (lowercased, used by prune)
//! ```
//!
//! Relative paths always use `/` as separator regardless of platform, so the
//! same strings can be persisted, compared and turned into URLs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of every generated thumbnail and poster.
pub const THUMB_EXTENSION: &str = "jpg";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Kind of a supported media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by extension (case-insensitive). `None` for anything
    /// outside the supported sets.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Prefix used for signature store keys.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Video => "vid",
        }
    }
}

/// Entries whose name starts with a dot are invisible to every walk.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// `path` relative to `root`, joined with `/`. Empty for the root itself.
pub fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a `/`-separated relative path onto a filesystem root.
pub fn join_relative(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Split a relative path into `(dir, file_name)`; `dir` is empty at the top level.
fn split_dir(rel: &str) -> (&str, &str) {
    match rel.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", rel),
    }
}

/// Strip the last extension from a file name. Dotfiles keep their name.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Relative path of the thumbnail for a media file: same directory, same
/// stem, `.jpg` extension. Images and videos map the same way.
pub fn thumb_relative(rel: &str) -> String {
    let (dir, name) = split_dir(rel);
    let file = format!("{}.{}", strip_extension(name), THUMB_EXTENSION);
    if dir.is_empty() {
        file
    } else {
        format!("{dir}/{file}")
    }
}

/// Absolute thumbnail path under `thumbs_root`.
pub fn thumb_path(thumbs_root: &Path, rel: &str) -> PathBuf {
    join_relative(thumbs_root, &thumb_relative(rel))
}

/// Join a URL prefix and a relative path without doubling slashes.
fn url_join(prefix: &str, rel: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if rel.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}

/// Public URL of the thumbnail (or poster) for a media file.
pub fn thumb_url(thumbs_prefix: &str, rel: &str) -> String {
    url_join(thumbs_prefix, &thumb_relative(rel))
}

/// Public URL of the original media file.
pub fn media_url(media_prefix: &str, rel: &str) -> String {
    url_join(media_prefix, rel)
}

/// Lowercased extension-less path used to pair thumbnails with sources.
pub fn stem_key(rel: &str) -> String {
    let (dir, name) = split_dir(rel);
    let stem = strip_extension(name);
    if dir.is_empty() {
        stem.to_lowercase()
    } else {
        format!("{dir}/{stem}").to_lowercase()
    }
}
