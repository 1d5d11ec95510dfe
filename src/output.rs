//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ## Thumbs
//!
//! ```text
//! Found 12 images, 2 videos
//!     image Trips/beach.jpg: cached
//!     video Trips/surf.mp4: generated
//! Thumbnails: 13 cached, 1 generated (14 total)
//! ```
//!
//! ## Index
//!
//! ```text
//! Indexed 4 folders, 14 media files
//! ```
//!
//! ## Prune
//!
//! ```text
//! REMOVE media    Old/gone.jpg
//! REMOVE thumb    Old/gone.jpg
//! REMOVE index    Old/index.json
//! RMDIR  thumbs   Old
//! Pruned 3 files, 1 directory
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure
//! and do no I/O.

use crate::index::IndexOutcome;
use crate::paths::MediaKind;
use crate::prune::{PruneReport, Removal};
use crate::thumbs::{ThumbEvent, ThumbReport, ThumbStatus};

/// Singular or plural noun for a count: `1 video`, `2 videos`.
fn counted(n: usize, noun: &str) -> String {
    counted_as(n, noun, &format!("{noun}s"))
}

fn counted_as(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Relative directory for display; the root is shown as `/`.
fn display_rel(rel: &str) -> &str {
    if rel.is_empty() { "/" } else { rel }
}

// ============================================================================
// Thumbs
// ============================================================================

/// Format a single thumbnail progress event as display lines.
pub fn format_thumb_event(event: &ThumbEvent) -> Vec<String> {
    match event {
        ThumbEvent::Scanned { images, videos } => vec![format!(
            "Found {}, {}",
            counted(*images, "image"),
            counted(*videos, "video")
        )],
        ThumbEvent::Processed {
            kind,
            rel_path,
            status,
        } => {
            let kind = match kind {
                MediaKind::Image => "image",
                MediaKind::Video => "video",
            };
            let status = match status {
                ThumbStatus::Cached => "cached",
                ThumbStatus::Generated => "generated",
            };
            vec![format!("    {kind} {rel_path}: {status}")]
        }
    }
}

pub fn format_thumb_summary(report: &ThumbReport) -> Vec<String> {
    vec![format!("Thumbnails: {}", report.stats)]
}

pub fn print_thumb_summary(report: &ThumbReport) {
    for line in format_thumb_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Index
// ============================================================================

pub fn format_index_outcome(outcome: &IndexOutcome) -> Vec<String> {
    vec![format!(
        "Indexed {}, {}",
        counted(outcome.folders_written, "folder"),
        counted(outcome.media_listed, "media file")
    )]
}

pub fn print_index_outcome(outcome: &IndexOutcome) {
    for line in format_index_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Prune
// ============================================================================

/// Format one removal as a fixed-width action line.
fn removal_line(removal: &Removal) -> String {
    match removal {
        Removal::Media(rel) => format!("REMOVE media    {rel}"),
        Removal::Thumb(rel) => format!("REMOVE thumb    {rel}"),
        Removal::DataFile(rel) => format!("REMOVE datafile {rel}"),
        Removal::Index(rel) => format!("REMOVE index    {rel}"),
        Removal::Dir { root, rel } => {
            format!("RMDIR  {:<8} {}", root.label(), display_rel(rel))
        }
    }
}

/// Format the prune report: one line per removal, then a summary.
pub fn format_prune_report(report: &PruneReport) -> Vec<String> {
    let mut lines: Vec<String> = report.removals.iter().map(removal_line).collect();
    if report.removals.is_empty() {
        lines.push("Nothing to prune".to_string());
    } else {
        lines.push(format!(
            "Pruned {}, {}",
            counted(report.files_removed(), "file"),
            counted_as(report.dirs_removed(), "directory", "directories")
        ));
    }
    lines
}

pub fn print_prune_report(report: &PruneReport) {
    for line in format_prune_report(report) {
        println!("{}", line);
    }
}
