//! Filesystem scanning into a typed source tree.
//!
//! Every later stage works on the [`FolderNode`] tree built here rather than
//! reading directories ad hoc. The tree contains:
//!
//! - one [`FolderNode`] per directory reachable from the source root,
//! - one [`MediaFile`] per file with a supported image or video extension.
//!
//! Everything else (unsupported extensions, hidden entries whose name starts
//! with `.`, symlinks) is left out entirely, so it never shows up in an index
//! and never gets a thumbnail. Symlinks are not followed, which keeps the walk
//! finite and matches what the prune walk sees.
//!
//! Children are sorted by file name (byte order), which makes every listing
//! derived from the tree independent of filesystem enumeration order.

use crate::paths::{self, MediaKind};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
}

/// A supported media file in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// File name including extension, e.g. `beach.mp4`.
    pub name: String,
    /// Path relative to the source root, `/`-separated.
    pub rel_path: String,
    pub kind: MediaKind,
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
}

/// A directory in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Directory name; empty for the root.
    pub name: String,
    /// Path relative to the source root; empty for the root.
    pub rel_path: String,
    pub folders: Vec<FolderNode>,
    pub media: Vec<MediaFile>,
}

impl FolderNode {
    /// All media files in this subtree, depth-first, in listing order.
    pub fn all_media(&self) -> Vec<&MediaFile> {
        let mut out = Vec::new();
        self.collect_media(&mut out);
        out
    }

    fn collect_media<'a>(&'a self, out: &mut Vec<&'a MediaFile>) {
        out.extend(self.media.iter());
        for folder in &self.folders {
            folder.collect_media(out);
        }
    }

    /// Number of directories in this subtree, including this one.
    pub fn folder_count(&self) -> usize {
        1 + self.folders.iter().map(FolderNode::folder_count).sum::<usize>()
    }
}

/// Scan `root` into a [`FolderNode`] tree.
pub fn scan(root: &Path) -> Result<FolderNode, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::SourceNotFound(root.to_path_buf()));
    }
    scan_directory(root, root, String::new())
}

fn scan_directory(root: &Path, dir: &Path, name: String) -> Result<FolderNode, ScanError> {
    let mut subdirs: Vec<(String, PathBuf)> = Vec::new();
    let mut files: Vec<(String, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if paths::is_hidden(&file_name) {
            continue;
        }
        // `DirEntry::file_type` does not follow links, so symlinks match neither arm.
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push((file_name, entry.path()));
        } else if file_type.is_file() {
            files.push((file_name, entry.path()));
        }
    }

    subdirs.sort();
    files.sort();

    let media = files
        .into_iter()
        .filter_map(|(name, path)| {
            let kind = MediaKind::from_path(&path)?;
            Some(MediaFile {
                rel_path: paths::relative(root, &path),
                name,
                kind,
                path,
            })
        })
        .collect();

    let folders = subdirs
        .into_iter()
        .map(|(name, path)| scan_directory(root, &path, name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FolderNode {
        rel_path: paths::relative(root, dir),
        name,
        folders,
        media,
    })
}
