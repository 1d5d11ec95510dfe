//! Folder index generation.
//!
//! Writes one `index.json` per source directory under the data root, in
//! post-order: every subdirectory's index is written before its parent's, and
//! the parent summarizes each child with a *lead thumbnail* taken from the
//! child's index.
//!
//! ## Document
//!
//! ```json
//! {
//!   "title": "Trips",
//!   "path": "Trips",
//!   "folders": [{ "name": "2019", "path": "Trips/2019", "leadThumb": "/thumbs/Trips/2019/a.jpg" }],
//!   "media": [
//!     { "name": "beach.jpg", "type": "image", "src": "/media/Trips/beach.jpg", "thumb": "/thumbs/Trips/beach.jpg" },
//!     { "name": "surf.mp4", "type": "video", "src": "/media/Trips/surf.mp4", "thumb": "/thumbs/Trips/surf.jpg", "poster": "/thumbs/Trips/surf.jpg" }
//!   ]
//! }
//! ```
//!
//! The root's title is `"Home"` and its path is `""`.
//!
//! ## Lead thumbnails
//!
//! A folder's lead thumbnail is the thumb of its first media item or, when it
//! has no media, the lead thumbnail of its first subfolder. This lets a cover
//! image bubble up from arbitrarily deep image-only folders. A subtree whose
//! first branch holds no media at all has a `null` lead.
//!
//! ## Expected state
//!
//! While walking, every visited folder and media path is recorded into an
//! [`ExpectedSnapshot`], returned to the caller for the prune stage.
//!
//! Indexes are regenerated on every pass; nothing here is memoized.

use crate::paths::{self, MediaKind};
use crate::scan::{FolderNode, MediaFile};
use crate::snapshot::ExpectedSnapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of every folder index.
pub const INDEX_FILENAME: &str = "index.json";

/// Title of the root folder's index.
const ROOT_TITLE: &str = "Home";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Public URL prefixes used in index documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPrefixes {
    pub media: String,
    pub thumbs: String,
}

impl Default for UrlPrefixes {
    fn default() -> Self {
        Self {
            media: "/media".into(),
            thumbs: "/thumbs".into(),
        }
    }
}

/// One `index.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderIndex {
    pub title: String,
    pub path: String,
    pub folders: Vec<FolderSummary>,
    pub media: Vec<MediaRecord>,
}

/// A subfolder as listed in its parent's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummary {
    pub name: String,
    pub path: String,
    pub lead_thumb: Option<String>,
}

/// A media file as listed in its folder's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub src: String,
    pub thumb: String,
    /// Present for videos only; same URL as `thumb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl MediaRecord {
    pub fn from_file(file: &MediaFile, urls: &UrlPrefixes) -> Self {
        let thumb = paths::thumb_url(&urls.thumbs, &file.rel_path);
        Self {
            name: file.name.clone(),
            kind: file.kind,
            src: paths::media_url(&urls.media, &file.rel_path),
            poster: (file.kind == MediaKind::Video).then(|| thumb.clone()),
            thumb,
        }
    }
}

impl FolderIndex {
    /// Thumbnail representing this folder in its parent's listing.
    pub fn lead_thumb(&self) -> Option<String> {
        match self.media.first() {
            Some(first) if !first.thumb.is_empty() => Some(first.thumb.clone()),
            _ => self.folders.first().and_then(|f| f.lead_thumb.clone()),
        }
    }
}

/// What an index pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub snapshot: ExpectedSnapshot,
    pub folders_written: usize,
    pub media_listed: usize,
}

/// Write every folder index for `tree` under `data_root`.
pub fn build_indexes(
    tree: &FolderNode,
    data_root: &Path,
    urls: &UrlPrefixes,
) -> Result<IndexOutcome, IndexError> {
    fs::create_dir_all(data_root)?;
    let mut snapshot = ExpectedSnapshot::default();
    let mut folders_written = 0;
    build_folder(tree, data_root, urls, &mut snapshot, &mut folders_written)?;
    Ok(IndexOutcome {
        media_listed: snapshot.media.len(),
        snapshot,
        folders_written,
    })
}

fn build_folder(
    node: &FolderNode,
    data_root: &Path,
    urls: &UrlPrefixes,
    snapshot: &mut ExpectedSnapshot,
    written: &mut usize,
) -> Result<FolderIndex, IndexError> {
    let media: Vec<MediaRecord> = node
        .media
        .iter()
        .map(|file| {
            snapshot.record_media(&file.rel_path);
            MediaRecord::from_file(file, urls)
        })
        .collect();

    let mut folders = Vec::with_capacity(node.folders.len());
    for child in &node.folders {
        let child_index = build_folder(child, data_root, urls, snapshot, written)?;
        folders.push(FolderSummary {
            name: child.name.clone(),
            path: child.rel_path.clone(),
            lead_thumb: child_index.lead_thumb(),
        });
    }

    snapshot.record_folder(&node.rel_path);
    let index = FolderIndex {
        title: if node.rel_path.is_empty() {
            ROOT_TITLE.to_string()
        } else {
            node.rel_path.clone()
        },
        path: node.rel_path.clone(),
        folders,
        media,
    };
    write_index(data_root, &index)?;
    *written += 1;
    Ok(index)
}

/// Path of the index document for a folder.
pub fn index_path(data_root: &Path, rel_path: &str) -> PathBuf {
    paths::join_relative(data_root, rel_path).join(INDEX_FILENAME)
}

fn write_index(data_root: &Path, index: &FolderIndex) -> Result<(), IndexError> {
    let path = index_path(data_root, &index.path);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string(index)?)?;
    Ok(())
}

/// Read a previously written folder index.
pub fn read_index(data_root: &Path, rel_path: &str) -> Result<FolderIndex, IndexError> {
    let content = fs::read_to_string(index_path(data_root, rel_path))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::touch;
    use tempfile::TempDir;

    fn build(source: &Path, data: &Path) -> IndexOutcome {
        let tree = scan(source).unwrap();
        build_indexes(&tree, data, &UrlPrefixes::default()).unwrap()
    }

    #[test]
    fn media_records_for_images_and_videos() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("Trips/beach.JPG"));
        touch(&src.join("Trips/surf.mp4"));
        let data = tmp.path().join("data");
        build(&src, &data);

        let idx = read_index(&data, "Trips").unwrap();
        assert_eq!(idx.title, "Trips");
        assert_eq!(idx.path, "Trips");
        assert_eq!(
            idx.media[0],
            MediaRecord {
                name: "beach.JPG".into(),
                kind: MediaKind::Image,
                src: "/media/Trips/beach.JPG".into(),
                thumb: "/thumbs/Trips/beach.jpg".into(),
                poster: None,
            }
        );
        assert_eq!(idx.media[1].kind, MediaKind::Video);
        assert_eq!(idx.media[1].poster.as_deref(), Some("/thumbs/Trips/surf.jpg"));
        assert_eq!(idx.media[1].poster.as_deref(), Some(idx.media[1].thumb.as_str()));
    }

    #[test]
    fn json_shape_matches_client_contract() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("clip.mp4"));
        touch(&src.join("x.jpg"));
        fs::create_dir_all(src.join("Empty")).unwrap();
        let data = tmp.path().join("data");
        build(&src, &data);

        let raw = fs::read_to_string(index_path(&data, "")).unwrap();
        assert_eq!(
            raw,
            concat!(
                r#"{"title":"Home","path":"","#,
                r#""folders":[{"name":"Empty","path":"Empty","leadThumb":null}],"#,
                r#""media":[{"name":"clip.mp4","type":"video","src":"/media/clip.mp4","thumb":"/thumbs/clip.jpg","poster":"/thumbs/clip.jpg"},"#,
                r#"{"name":"x.jpg","type":"image","src":"/media/x.jpg","thumb":"/thumbs/x.jpg"}]}"#
            )
        );
    }

    #[test]
    fn lead_thumb_bubbles_up_from_deep_folders() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("A/B/img1.jpg"));
        fs::create_dir_all(src.join("C")).unwrap();
        let data = tmp.path().join("data");
        build(&src, &data);

        let root = read_index(&data, "").unwrap();
        assert_eq!(root.folders[0].name, "A");
        assert_eq!(root.folders[0].lead_thumb.as_deref(), Some("/thumbs/A/B/img1.jpg"));
        assert_eq!(root.folders[1].name, "C");
        assert_eq!(root.folders[1].lead_thumb, None);
    }

    #[test]
    fn lead_thumb_prefers_own_media_over_subfolders() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("A/Deeper/first.jpg"));
        touch(&src.join("A/own.jpg"));
        let data = tmp.path().join("data");
        build(&src, &data);

        let root = read_index(&data, "").unwrap();
        assert_eq!(root.folders[0].lead_thumb.as_deref(), Some("/thumbs/A/own.jpg"));
    }

    #[test]
    fn lead_thumb_only_follows_first_subfolder() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        fs::create_dir_all(src.join("A/1-empty")).unwrap();
        touch(&src.join("A/2-full/x.jpg"));
        let data = tmp.path().join("data");
        build(&src, &data);

        let root = read_index(&data, "").unwrap();
        assert_eq!(root.folders[0].lead_thumb, None);
    }

    #[test]
    fn listings_are_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("b.jpg"));
        touch(&src.join("a.jpg"));
        touch(&src.join("readme.txt"));
        let data = tmp.path().join("data");
        build(&src, &data);

        let root = read_index(&data, "").unwrap();
        let names: Vec<&str> = root.media.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn snapshot_records_every_folder_and_media_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("top.jpg"));
        touch(&src.join("A/B/deep.mp4"));
        touch(&src.join("A/skip.png"));
        let data = tmp.path().join("data");
        let outcome = build(&src, &data);

        let folders: Vec<&str> = outcome.snapshot.folders.iter().map(String::as_str).collect();
        let media: Vec<&str> = outcome.snapshot.media.iter().map(String::as_str).collect();
        assert_eq!(folders, vec!["", "A", "A/B"]);
        assert_eq!(media, vec!["A/B/deep.mp4", "top.jpg"]);
        assert_eq!(outcome.folders_written, 3);
        assert_eq!(outcome.media_listed, 2);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("A/x.jpg"));
        touch(&src.join("y.mp4"));
        let data = tmp.path().join("data");

        build(&src, &data);
        let first = fs::read(index_path(&data, "")).unwrap();
        let first_child = fs::read(index_path(&data, "A")).unwrap();
        build(&src, &data);

        assert_eq!(fs::read(index_path(&data, "")).unwrap(), first);
        assert_eq!(fs::read(index_path(&data, "A")).unwrap(), first_child);
    }

    #[test]
    fn custom_url_prefixes() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("media");
        touch(&src.join("x.jpg"));
        let data = tmp.path().join("data");
        let tree = scan(&src).unwrap();
        let urls = UrlPrefixes {
            media: "/gallery/originals".into(),
            thumbs: "/gallery/t/".into(),
        };
        build_indexes(&tree, &data, &urls).unwrap();

        let root = read_index(&data, "").unwrap();
        assert_eq!(root.media[0].src, "/gallery/originals/x.jpg");
        assert_eq!(root.media[0].thumb, "/gallery/t/x.jpg");
    }
}
