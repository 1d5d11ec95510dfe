//! Thumbnail and poster generation.
//!
//! Every supported source file gets exactly one derived JPEG under the
//! thumbnail root, at the mirrored path with a `.jpg` extension:
//!
//! - **Images** are decoded, scaled to a fixed height (200px by default,
//!   never enlarged) and re-encoded at quality 80.
//! - **Videos** go through a two-step pipeline: a single frame at the 1s mark
//!   is pulled out by a [`FrameExtractor`], then a translucent play glyph is
//!   blended onto its centre.
//!
//! Both paths write to a uniquely named temp file next to the target and
//! rename it into place, so a thumbnail is never observable half-written.
//!
//! ## Staleness
//!
//! Work is skipped when the file's [signature](crate::signature) matches the
//! stored one and the output already exists. Per-file transforms have no
//! shared state besides the store, so they run on the rayon pool: workers
//! only *read* the store and hand back the entries to record, which are
//! collected after every worker finished. The saved store holds exactly the
//! files of this pass, so entries for deleted sources drop out. It is saved
//! only after the whole pass succeeded; a failed pass leaves the previous
//! store in place and the next run treats the unfinished files as stale.
//!
//! The module is split into:
//! - [`calculations`]: pure dimension math
//! - [`params`]: [`Quality`], [`ThumbSpec`], [`FrameRequest`]
//! - [`extract`]: [`FrameExtractor`] trait + [`FfmpegExtractor`]
//! - [`overlay`]: play glyph rasterization and compositing
//! - [`operations`]: decode/extract, render and atomic JPEG writes

pub mod calculations;
pub mod extract;
pub mod operations;
pub mod overlay;
pub mod params;

pub use extract::{ExtractError, FfmpegExtractor, FrameExtractor};
pub use params::{FrameRequest, Quality, ThumbSpec};

use crate::paths::{self, MediaKind};
use crate::scan::{FolderNode, MediaFile};
use crate::signature::{self, SignatureStats, SignatureStore};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Whether a thumbnail was reused or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbStatus {
    Cached,
    Generated,
}

/// Progress events emitted during [`generate_thumbnails`].
///
/// Sent through an optional channel so the CLI can print progress while
/// workers run. Events for different files may arrive in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbEvent {
    Scanned { images: usize, videos: usize },
    Processed {
        kind: MediaKind,
        rel_path: String,
        status: ThumbStatus,
    },
}

/// Result of [`Transformer::ensure_thumbnail`]: the store entry to record and
/// what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub key: String,
    pub signature: String,
    pub output: PathBuf,
    pub status: ThumbStatus,
}

/// Summary of a thumbnail pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThumbReport {
    pub images: usize,
    pub videos: usize,
    pub stats: SignatureStats,
}

/// Produces thumbnails for one thumbnail root with one extractor.
pub struct Transformer<'a, E: FrameExtractor> {
    thumbs_root: &'a Path,
    spec: ThumbSpec,
    extractor: &'a E,
}

impl<'a, E: FrameExtractor> Transformer<'a, E> {
    pub fn new(thumbs_root: &'a Path, spec: ThumbSpec, extractor: &'a E) -> Self {
        Self {
            thumbs_root,
            spec,
            extractor,
        }
    }

    /// Make sure `file`'s thumbnail (or poster) is current.
    ///
    /// Does nothing when `store` already holds the file's signature and the
    /// output exists. The returned entry must be recorded in the store by the
    /// caller once the pass succeeds.
    pub fn ensure_thumbnail(
        &self,
        file: &MediaFile,
        store: &SignatureStore,
    ) -> Result<Transformed, ThumbError> {
        let key = signature::store_key(file.kind, &file.rel_path);
        let sig = signature::file_signature(&file.path)?;
        let output = paths::thumb_path(self.thumbs_root, &file.rel_path);

        let status = if store.is_fresh(&key, &sig, &output) {
            ThumbStatus::Cached
        } else {
            let rendered = match file.kind {
                MediaKind::Image => operations::render_image_thumbnail(&file.path, &self.spec)?,
                MediaKind::Video => {
                    operations::render_video_poster(self.extractor, &file.path, &self.spec)?
                }
            };
            operations::write_jpeg_atomic(&rendered, &output, self.spec.quality)?;
            ThumbStatus::Generated
        };

        Ok(Transformed {
            key,
            signature: sig,
            output,
            status,
        })
    }
}

/// Bring every thumbnail under `thumbs_root` up to date with `tree`.
///
/// Loads the signature store from `thumbs_root`, transforms all media files
/// in parallel, then saves a store rebuilt from this pass's signatures. Any
/// failure aborts the pass before the store is saved.
pub fn generate_thumbnails(
    tree: &FolderNode,
    thumbs_root: &Path,
    spec: ThumbSpec,
    extractor: &impl FrameExtractor,
    events: Option<Sender<ThumbEvent>>,
) -> Result<ThumbReport, ThumbError> {
    std::fs::create_dir_all(thumbs_root)?;
    let store = SignatureStore::load(thumbs_root);

    let media = tree.all_media();
    let videos = media.iter().filter(|m| m.kind == MediaKind::Video).count();
    let images = media.len() - videos;
    emit(&events, ThumbEvent::Scanned { images, videos });

    let transformer = Transformer::new(thumbs_root, spec, extractor);
    let results = media
        .par_iter()
        .map(|file| {
            let done = transformer.ensure_thumbnail(file, &store)?;
            emit(
                &events,
                ThumbEvent::Processed {
                    kind: file.kind,
                    rel_path: file.rel_path.clone(),
                    status: done.status,
                },
            );
            Ok(done)
        })
        .collect::<Result<Vec<_>, ThumbError>>()?;

    let mut stats = SignatureStats::default();
    let mut current = SignatureStore::empty();
    for done in results {
        match done.status {
            ThumbStatus::Cached => stats.hit(),
            ThumbStatus::Generated => stats.miss(),
        }
        current.put(done.key, done.signature);
    }
    current.save(thumbs_root)?;

    Ok(ThumbReport {
        images,
        videos,
        stats,
    })
}

fn emit(events: &Option<Sender<ThumbEvent>>, event: ThumbEvent) {
    if let Some(tx) = events {
        // Printer may have gone away; progress is best-effort.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::{FakeExtractor, set_mtime, touch, write_test_jpeg};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source: PathBuf,
        thumbs: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("media");
        let thumbs = tmp.path().join("thumbs");
        write_test_jpeg(&source.join("a.jpg"), 400, 300);
        write_test_jpeg(&source.join("Trips/b.JPEG"), 300, 600);
        touch(&source.join("Trips/clip.mp4"));
        touch(&source.join("Trips/notes.txt"));
        Fixture {
            _tmp: tmp,
            source,
            thumbs,
        }
    }

    fn run(f: &Fixture, extractor: &FakeExtractor) -> Result<ThumbReport, ThumbError> {
        let tree = scan(&f.source).unwrap();
        generate_thumbnails(&tree, &f.thumbs, ThumbSpec::default(), extractor, None)
    }

    #[test]
    fn first_run_generates_every_thumbnail() {
        let f = fixture();
        let extractor = FakeExtractor::new(356, 200);
        let report = run(&f, &extractor).unwrap();

        assert_eq!((report.images, report.videos), (2, 1));
        assert_eq!(report.stats.generated, 3);
        assert!(f.thumbs.join("a.jpg").exists());
        assert!(f.thumbs.join("Trips/b.jpg").exists());
        assert!(f.thumbs.join("Trips/clip.jpg").exists());
        assert!(!f.thumbs.join("Trips/notes.jpg").exists());
        let mut outputs: Vec<_> = fs::read_dir(f.thumbs.join("Trips"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        outputs.sort();
        assert_eq!(outputs, vec!["b.jpg", "clip.jpg"]);

        let store = SignatureStore::load(&f.thumbs);
        assert!(store.get("img:a.jpg").is_some());
        assert!(store.get("img:Trips/b.JPEG").is_some());
        assert!(store.get("vid:Trips/clip.mp4").is_some());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let f = fixture();
        let extractor = FakeExtractor::new(356, 200);
        run(&f, &extractor).unwrap();
        let store_before = fs::read(signature::store_path(&f.thumbs)).unwrap();
        let thumb_before = fs::read(f.thumbs.join("a.jpg")).unwrap();

        let report = run(&f, &extractor).unwrap();

        assert_eq!(report.stats.generated, 0);
        assert_eq!(report.stats.cached, 3);
        assert_eq!(extractor.calls().len(), 1);
        assert_eq!(fs::read(signature::store_path(&f.thumbs)).unwrap(), store_before);
        assert_eq!(fs::read(f.thumbs.join("a.jpg")).unwrap(), thumb_before);
    }

    #[test]
    fn changed_source_regenerates_only_that_file() {
        let f = fixture();
        let extractor = FakeExtractor::new(356, 200);
        run(&f, &extractor).unwrap();

        set_mtime(&f.source.join("a.jpg"), 1_234_567_890);
        let report = run(&f, &extractor).unwrap();

        assert_eq!(report.stats.generated, 1);
        assert_eq!(report.stats.cached, 2);
        assert_eq!(extractor.calls().len(), 1);
    }

    #[test]
    fn missing_output_is_regenerated() {
        let f = fixture();
        let extractor = FakeExtractor::new(356, 200);
        run(&f, &extractor).unwrap();

        fs::remove_file(f.thumbs.join("Trips/clip.jpg")).unwrap();
        let report = run(&f, &extractor).unwrap();

        assert_eq!(report.stats.generated, 1);
        assert_eq!(extractor.calls().len(), 2);
        assert!(f.thumbs.join("Trips/clip.jpg").exists());
    }

    #[test]
    fn store_forgets_deleted_sources() {
        let f = fixture();
        let extractor = FakeExtractor::new(356, 200);
        run(&f, &extractor).unwrap();
        fs::remove_file(f.source.join("Trips/b.JPEG")).unwrap();

        let report = run(&f, &extractor).unwrap();

        assert_eq!(report.stats.cached, 2);
        let store = SignatureStore::load(&f.thumbs);
        assert_eq!(store.get("img:Trips/b.JPEG"), None);
        assert!(store.get("img:a.jpg").is_some());
        assert!(store.get("vid:Trips/clip.mp4").is_some());
    }

    #[test]
    fn extractor_failure_aborts_without_saving_store() {
        let f = fixture();
        let result = run(&f, &FakeExtractor::failing());

        assert!(matches!(result, Err(ThumbError::Extract(_))));
        assert!(!signature::store_path(&f.thumbs).exists());
        assert!(!f.thumbs.join("Trips/clip.jpg").exists());
    }

    #[test]
    fn events_report_each_file() {
        let f = fixture();
        let tree = scan(&f.source).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        generate_thumbnails(
            &tree,
            &f.thumbs,
            ThumbSpec::default(),
            &FakeExtractor::new(356, 200),
            Some(tx),
        )
        .unwrap();

        let events: Vec<ThumbEvent> = rx.iter().collect();
        assert_eq!(events[0], ThumbEvent::Scanned { images: 2, videos: 1 });
        let mut processed: Vec<&str> = events[1..]
            .iter()
            .map(|e| match e {
                ThumbEvent::Processed { rel_path, .. } => rel_path.as_str(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        processed.sort();
        assert_eq!(processed, vec!["Trips/b.JPEG", "Trips/clip.mp4", "a.jpg"]);
    }

    #[test]
    fn ensure_thumbnail_reports_key_and_output() {
        let f = fixture();
        let tree = scan(&f.source).unwrap();
        let extractor = FakeExtractor::new(356, 200);
        let transformer = Transformer::new(&f.thumbs, ThumbSpec::default(), &extractor);

        let video = &tree.folders[0].media[1];
        let done = transformer
            .ensure_thumbnail(video, &SignatureStore::empty())
            .unwrap();

        assert_eq!(done.key, "vid:Trips/clip.mp4");
        assert_eq!(done.output, f.thumbs.join("Trips/clip.jpg"));
        assert_eq!(done.status, ThumbStatus::Generated);
    }
}
