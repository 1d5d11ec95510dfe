use clap::{Parser, Subcommand};
use media_gallery::config::{self, GalleryConfig};
use media_gallery::prune::{self, PruneOutcome};
use media_gallery::thumbs::{self, FfmpegExtractor};
use media_gallery::{index, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "media-gallery")]
#[command(about = "Thumbnails, posters and folder indexes for a static media gallery")]
#[command(long_about = "\
Thumbnails, posters and folder indexes for a static media gallery

The media directory is the data source: folders become albums, every
.jpg/.jpeg becomes a photo and every .mp4 a video. Each pass derives files
under the public directory:

  public/
  ├── .expected.json               # Written by `index`, read by `prune`
  ├── media/                       # Originals (default SOURCE)
  │   ├── beach.jpg
  │   └── Trips/
  │       └── surf.mp4
  ├── thumbs/                      # Written by `thumbs`
  │   ├── .gallery-manifest.json   # Signatures of already-processed files
  │   ├── beach.jpg                # 200px high thumbnail
  │   └── Trips/
  │       └── surf.jpg             # Poster frame with play glyph
  └── data/                        # Written by `index`
      ├── index.json
      └── Trips/
          └── index.json

Default directories come from gallery.toml ([layout]) when present.
Run 'media-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing or stale thumbnails and video posters
    Thumbs {
        /// Source media directory [default: public/media]
        source: Option<PathBuf>,
        /// Thumbnail output directory [default: public/thumbs]
        thumbs: Option<PathBuf>,
    },
    /// Write a JSON index per folder and the expected-state snapshot
    Index {
        /// Source media directory [default: public/media]
        source: Option<PathBuf>,
        /// Public directory receiving data/ and .expected.json [default: public]
        public: Option<PathBuf>,
    },
    /// Delete derived files that the last index pass did not see
    Prune {
        /// Public directory holding media/, thumbs/ and data/ [default: public]
        public: Option<PathBuf>,
    },
    /// Run thumbs then index
    Build {
        /// Source media directory [default: public/media]
        source: Option<PathBuf>,
        /// Public directory [default: public]
        public: Option<PathBuf>,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let cfg = config::load_config(Path::new("."))?;

    match cli.command {
        Command::Thumbs { source, thumbs } => {
            let source = source.unwrap_or_else(|| cfg.layout.source());
            let thumbs = thumbs.unwrap_or_else(|| cfg.layout.thumbs());
            run_thumbs(&cfg, &source, &thumbs)?;
        }
        Command::Index { source, public } => {
            let source = source.unwrap_or_else(|| cfg.layout.source());
            let public = public.unwrap_or_else(|| cfg.layout.public_dir.clone());
            run_index(&cfg, &source, &public)?;
        }
        Command::Prune { public } => {
            let public = public.unwrap_or_else(|| cfg.layout.public_dir.clone());
            run_prune(&cfg, &public)?;
        }
        Command::Build { source, public } => {
            let public = public.unwrap_or_else(|| cfg.layout.public_dir.clone());
            let source = source.unwrap_or_else(|| public.join(&cfg.layout.media_dir));
            let thumbs = public.join(&cfg.layout.thumbs_dir);

            println!("==> Stage 1: Thumbnails {}", thumbs.display());
            run_thumbs(&cfg, &source, &thumbs)?;

            println!("==> Stage 2: Indexes {}", public.display());
            run_index(&cfg, &source, &public)?;

            println!("==> Build complete: {}", public.display());
        }
        Command::GenConfig => {}
    }

    Ok(())
}

fn run_thumbs(
    cfg: &GalleryConfig,
    source: &Path,
    thumbs_root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&cfg.processing);
    let tree = scan::scan(source)?;
    let extractor = FfmpegExtractor::new(&cfg.video.ffmpeg);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_thumb_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = thumbs::generate_thumbnails(
        &tree,
        thumbs_root,
        cfg.thumb_spec(),
        &extractor,
        Some(tx),
    );
    // The sender is dropped with the pass, which ends the printer loop.
    printer.join().map_err(|_| "progress printer thread panicked")?;

    output::print_thumb_summary(&result?);
    Ok(())
}

fn run_index(
    cfg: &GalleryConfig,
    source: &Path,
    public: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = scan::scan(source)?;
    let data_root = public.join(&cfg.layout.data_dir);
    let outcome = index::build_indexes(&tree, &data_root, &cfg.url_prefixes())?;
    outcome.snapshot.save(public)?;
    output::print_index_outcome(&outcome);
    Ok(())
}

fn run_prune(cfg: &GalleryConfig, public: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let roots = cfg.layout.derived_roots(public);
    match prune::prune_public(public, &roots)? {
        PruneOutcome::Pruned(report) => output::print_prune_report(&report),
        PruneOutcome::Skipped { reason } => eprintln!("warning: prune skipped: {reason}"),
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
