//! Expected-state snapshot shared between the index and prune stages.
//!
//! The index stage records every folder and media file it visited; the prune
//! stage deletes derived artifacts that are not in that record. The snapshot
//! is the only link between the two, persisted as `<public>/.expected.json`:
//!
//! ```json
//! { "folders": ["", "Trips"], "media": ["Trips/beach.jpg"] }
//! ```
//!
//! The root folder is the empty string. Both sets are written sorted so the
//! file is stable across identical builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the snapshot file within the public directory.
const SNAPSHOT_FILENAME: &str = ".expected.json";

/// Folders and media files the most recent index pass visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSnapshot {
    pub folders: BTreeSet<String>,
    pub media: BTreeSet<String>,
}

/// Outcome of [`ExpectedSnapshot::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState {
    Loaded(ExpectedSnapshot),
    Missing,
    /// The file exists but does not parse; treated like no snapshot at all.
    Corrupt(String),
}

impl ExpectedSnapshot {
    pub fn record_folder(&mut self, rel_path: &str) {
        self.folders.insert(rel_path.to_string());
    }

    pub fn record_media(&mut self, rel_path: &str) {
        self.media.insert(rel_path.to_string());
    }

    /// Read the snapshot from `public_dir`. Never fails.
    pub fn load(public_dir: &Path) -> SnapshotState {
        let content = match std::fs::read_to_string(snapshot_path(public_dir)) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SnapshotState::Missing,
            Err(e) => return SnapshotState::Corrupt(e.to_string()),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => SnapshotState::Loaded(snapshot),
            Err(e) => SnapshotState::Corrupt(e.to_string()),
        }
    }

    /// Write the snapshot to `public_dir`, replacing any previous one.
    pub fn save(&self, public_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(public_dir)?;
        let json = serde_json::to_string(self)?;
        std::fs::write(snapshot_path(public_dir), json)
    }

    /// Media paths lowercased, for case-insensitive matching.
    pub fn media_lowercase(&self) -> BTreeSet<String> {
        self.media.iter().map(|m| m.to_lowercase()).collect()
    }
}

/// Resolve the snapshot path for a public directory.
pub fn snapshot_path(public_dir: &Path) -> PathBuf {
    public_dir.join(SNAPSHOT_FILENAME)
}
