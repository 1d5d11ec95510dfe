//! # Media Gallery
//!
//! Build-time pipeline that turns a directory of photos and videos into the
//! derived files a static gallery front-end needs: scaled thumbnails, video
//! posters with a play glyph, and one JSON index document per folder.
//! The filesystem is the data source: folders become albums, file names
//! become titles, nothing else is configured per item.
//!
//! # Architecture: Three Passes Over One Tree
//!
//! ```text
//! 1. Thumbs   media/  →  thumbs/                     (JPEG per image, poster per video)
//! 2. Index    media/  →  data/**/index.json          (+ public/.expected.json)
//! 3. Prune    .expected.json  →  media/ thumbs/ data/ (delete what is not expected)
//! ```
//!
//! Each pass is independently runnable and idempotent. The thumbnail pass
//! skips unchanged files via a [signature store](signature); the index pass
//! rewrites every document deterministically; the prune pass only ever
//! deletes what the last index pass did not see, and does nothing at all
//! when that record is missing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the source tree into a sorted [`scan::FolderNode`] |
//! | [`paths`] | Relative-path, URL and derived-path conventions shared by every pass |
//! | [`signature`] | Persisted `<len>-<mtime>` signatures for incremental thumbnailing |
//! | [`thumbs`] | Image thumbnails and video posters, in parallel |
//! | [`index`] | Post-order folder index documents with lead-thumbnail bubbling |
//! | [`snapshot`] | Expected-state record handed from the index pass to the prune pass |
//! | [`prune`] | Deletes stale files in the derived trees, then empty directories |
//! | [`config`] | Optional `gallery.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for every pass |
//!
//! # Design Decisions
//!
//! ## Fixed-Height Thumbnails
//!
//! Thumbnails are scaled to a fixed height and keep the source aspect ratio,
//! which is what justified-row gallery layouts want. Sources shorter than
//! the target are re-encoded at their own size rather than enlarged.
//!
//! ## External Frame Extraction
//!
//! Video decoding is delegated to `ffmpeg` behind the
//! [`thumbs::FrameExtractor`] trait. The frame comes back in memory, the
//! glyph is composited, and only the finished poster touches the disk.
//!
//! ## Prune Needs a Snapshot
//!
//! The prune pass reads nothing but the snapshot written by the index pass.
//! Without one it refuses to delete anything, so a fresh or broken public
//! directory cannot be wiped by running the passes in the wrong order.

pub mod config;
pub mod index;
pub mod output;
pub mod paths;
pub mod prune;
pub mod scan;
pub mod signature;
pub mod snapshot;
pub mod thumbs;

#[cfg(test)]
pub(crate) mod test_helpers;
