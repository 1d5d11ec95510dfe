//! Garbage collection of derived artifacts.
//!
//! Reconciles the three derived roots against the [`ExpectedSnapshot`] left
//! by the last index pass:
//!
//! | Root | A file is kept when… |
//! |---|---|
//! | media mirror | its relative path (case-insensitive) is an expected media path |
//! | thumbnails | its extension-less path (case-insensitive) matches the stem of an expected media path |
//! | data | it is an `index.json` whose folder is an expected folder |
//!
//! Everything else is deleted, then each root is swept for directories left
//! empty, deepest first, so a chain of emptied folders collapses entirely.
//! The roots themselves are never removed.
//!
//! Hidden entries (leading `.`) are ignored, which keeps the signature store
//! and the snapshot itself out of reach. Symlinks are neither followed nor
//! removed; the scan skips them too, so they are never part of the snapshot.
//!
//! Without a readable snapshot there is no ground truth, so
//! [`prune_public`] deletes nothing and reports why.

use crate::index::INDEX_FILENAME;
use crate::paths;
use crate::snapshot::{ExpectedSnapshot, SnapshotState};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PruneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Which derived tree an artifact lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedRoot {
    Media,
    Thumbs,
    Data,
}

impl DerivedRoot {
    pub fn label(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Thumbs => "thumbs",
            Self::Data => "data",
        }
    }
}

/// Filesystem locations of the three derived trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedRoots {
    pub media: PathBuf,
    pub thumbs: PathBuf,
    pub data: PathBuf,
}

/// One deletion performed by the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// A media-mirror file with no expected source.
    Media(String),
    /// A thumbnail or poster whose source is gone.
    Thumb(String),
    /// A file under the data root that is not an index document.
    DataFile(String),
    /// An index document for a folder that no longer exists.
    Index(String),
    /// A directory left empty.
    Dir { root: DerivedRoot, rel: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removals: Vec<Removal>,
}

impl PruneReport {
    pub fn files_removed(&self) -> usize {
        self.removals
            .iter()
            .filter(|r| !matches!(r, Removal::Dir { .. }))
            .count()
    }

    pub fn dirs_removed(&self) -> usize {
        self.removals.len() - self.files_removed()
    }
}

/// Result of [`prune_public`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    Pruned(PruneReport),
    /// No usable snapshot; nothing was touched.
    Skipped { reason: String },
}

/// Load the snapshot from `public_dir` and prune `roots` against it.
pub fn prune_public(public_dir: &Path, roots: &DerivedRoots) -> Result<PruneOutcome, PruneError> {
    match ExpectedSnapshot::load(public_dir) {
        SnapshotState::Loaded(snapshot) => Ok(PruneOutcome::Pruned(prune(roots, &snapshot)?)),
        SnapshotState::Missing => Ok(PruneOutcome::Skipped {
            reason: "no expected-state snapshot found; run the index stage first".into(),
        }),
        SnapshotState::Corrupt(e) => Ok(PruneOutcome::Skipped {
            reason: format!("expected-state snapshot is unreadable ({e}); run the index stage again"),
        }),
    }
}

/// Delete every derived artifact not accounted for by `snapshot`.
pub fn prune(roots: &DerivedRoots, snapshot: &ExpectedSnapshot) -> Result<PruneReport, PruneError> {
    let mut report = PruneReport::default();

    let expected_media = snapshot.media_lowercase();
    for (path, rel) in collect_files(&roots.media)? {
        if !expected_media.contains(&rel.to_lowercase()) {
            fs::remove_file(&path)?;
            report.removals.push(Removal::Media(rel));
        }
    }

    let expected_stems: BTreeSet<String> =
        snapshot.media.iter().map(|m| paths::stem_key(m)).collect();
    for (path, rel) in collect_files(&roots.thumbs)? {
        if !expected_stems.contains(&paths::stem_key(&rel)) {
            fs::remove_file(&path)?;
            report.removals.push(Removal::Thumb(rel));
        }
    }

    for (path, rel) in collect_files(&roots.data)? {
        let (folder, name) = rel.rsplit_once('/').unwrap_or(("", rel.as_str()));
        if !name.eq_ignore_ascii_case(INDEX_FILENAME) {
            fs::remove_file(&path)?;
            report.removals.push(Removal::DataFile(rel));
        } else if !snapshot.folders.contains(folder) {
            fs::remove_file(&path)?;
            report.removals.push(Removal::Index(rel));
        }
    }

    for (root, dir) in [
        (DerivedRoot::Media, &roots.media),
        (DerivedRoot::Thumbs, &roots.thumbs),
        (DerivedRoot::Data, &roots.data),
    ] {
        remove_empty_dirs(root, dir, &mut report)?;
    }

    Ok(report)
}

fn walk_visible(root: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !paths::is_hidden(&e.file_name().to_string_lossy()))
}

/// All visible regular files under `root` with their `/`-separated relative paths.
fn collect_files(root: &Path) -> Result<Vec<(PathBuf, String)>, PruneError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in walk_visible(root) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let rel = paths::relative(root, entry.path());
            files.push((entry.into_path(), rel));
        }
    }
    files.sort();
    Ok(files)
}

/// Remove directories under `root` that are empty, deepest first.
fn remove_empty_dirs(
    which: DerivedRoot,
    root: &Path,
    report: &mut PruneReport,
) -> Result<(), PruneError> {
    if !root.is_dir() {
        return Ok(());
    }
    let mut dirs: Vec<(usize, PathBuf)> = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push((entry.depth(), entry.into_path()));
        }
    }
    // Deepest first; ties in reverse path order for a stable report.
    dirs.sort_by(|a, b| b.cmp(a));

    for (_, dir) in dirs {
        if fs::read_dir(&dir)?.next().is_none() {
            fs::remove_dir(&dir)?;
            report.removals.push(Removal::Dir {
                root: which,
                rel: paths::relative(root, &dir),
            });
        }
    }
    Ok(())
}
