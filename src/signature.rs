//! Signature store for incremental thumbnail builds.
//!
//! Decoding a JPEG and re-encoding it, or spawning ffmpeg for a video poster,
//! dominates the runtime of a build. This module lets the thumbnail stage skip
//! that work when a source file has not changed since the last successful run.
//!
//! # Signatures
//!
//! A signature is `"<size>-<mtime seconds>"`: the byte length of the source
//! plus its modification time truncated to whole seconds. It is cheap and
//! coarse:
//!
//! - no content hashing, so a touch-without-modify counts as a change and two
//!   edits within the same second that keep the size are missed;
//! - sub-second precision is dropped because copy tools often truncate it,
//!   which would otherwise flag every copied file as changed.
//!
//! # Keys
//!
//! Entries are keyed by `"<img|vid>:<relative path>"`.
//!
//! # Trust
//!
//! An entry only counts as a hit when the output artifact also exists on
//! disk. Use [`SignatureStore::is_fresh`], which checks both, rather than
//! comparing signatures by hand.
//!
//! # Storage
//!
//! The store is a JSON file at `<thumbs>/.gallery-manifest.json`, inside the
//! thumbnail root rather than the public directory. The `thumbs` stage is
//! only handed the source and thumbnail roots, and the store describes
//! exactly the outputs under the latter, so the two move together:
//!
//! ```json
//! { "files": { "img:Trips/beach.jpg": "482113-1700000000" } }
//! ```
//!
//! The leading dot keeps it out of every tree walk, so pruning never removes
//! it. Loading never fails: a missing or unparsable file yields an empty
//! store, which simply makes every file stale.

use crate::paths::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Name of the store file within the thumbnail root.
const STORE_FILENAME: &str = ".gallery-manifest.json";

/// Persisted mapping from artifact key to source signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureStore {
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl SignatureStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from the thumbnail root. Returns an empty store if the file
    /// doesn't exist or can't be parsed.
    pub fn load(thumbs_root: &Path) -> Self {
        let content = match std::fs::read_to_string(store_path(thumbs_root)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Save to the thumbnail root, overwriting any previous store.
    pub fn save(&self, thumbs_root: &Path) -> io::Result<()> {
        std::fs::create_dir_all(thumbs_root)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(store_path(thumbs_root), json)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.files.get(key).map(String::as_str)
    }

    pub fn put(&mut self, key: String, signature: String) {
        self.files.insert(key, signature);
    }

    /// True when the stored signature equals `signature` **and** `output`
    /// exists on disk.
    pub fn is_fresh(&self, key: &str, signature: &str, output: &Path) -> bool {
        self.get(key) == Some(signature) && output.exists()
    }
}

/// Store key for a media file.
pub fn store_key(kind: MediaKind, rel_path: &str) -> String {
    format!("{}:{}", kind.key_prefix(), rel_path)
}

/// Signature of a file from its metadata: `"<len>-<mtime seconds>"`.
///
/// Modification times before the epoch (or unavailable on the platform)
/// collapse to `0`, which still yields a stable signature.
pub fn signature_of(meta: &Metadata) -> String {
    let secs = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}-{}", meta.len(), secs)
}

/// Read metadata for `path` and compute its signature.
pub fn file_signature(path: &Path) -> io::Result<String> {
    Ok(signature_of(&std::fs::metadata(path)?))
}

/// Resolve the store path for a thumbnail root.
pub fn store_path(thumbs_root: &Path) -> PathBuf {
    thumbs_root.join(STORE_FILENAME)
}

/// Summary of store hits and misses for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SignatureStats {
    pub cached: u32,
    pub generated: u32,
}

impl SignatureStats {
    pub fn hit(&mut self) {
        self.cached += 1;
    }

    pub fn miss(&mut self) {
        self.generated += 1;
    }

    pub fn total(&self) -> u32 {
        self.cached + self.generated
    }
}

impl fmt::Display for SignatureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cached > 0 {
            write!(
                f,
                "{} cached, {} generated ({} total)",
                self.cached,
                self.generated,
                self.total()
            )
        } else {
            write!(f, "{} generated", self.generated)
        }
    }
}
