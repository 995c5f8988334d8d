//! # Video Shrinker - Main Entry Point
//!
//! ## Responsabilità:
//! - Parsing degli argomenti con `clap` (ogni opzione ha una variabile d'ambiente)
//! - Inizializzazione del logging con `tracing` su stderr
//! - Costruzione della `Config` e avvio della run
//!
//! Il processo termina con exit code 0 anche se singoli file falliscono.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! WEBM_CRF=34 video-shrinker --dry-run assets public
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use video_shrinker::config::DEFAULT_MIN_SIZE;
use video_shrinker::{Config, VideoShrinker};

#[derive(Parser)]
#[command(name = "video-shrinker", version)]
#[command(about = "Re-encode videos in place when the result is more than 5% smaller")]
struct Args {
    /// Root directories to search (default: `assets` and `public` under the base directory)
    roots: Vec<PathBuf>,

    /// Directory the default roots are resolved against
    #[arg(long, env = "VIDEO_SHRINKER_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// VP9 CRF for .webm files
    #[arg(long, env = "WEBM_CRF", default_value_t = 32)]
    webm_crf: u8,

    /// H.264 CRF for .mp4 files
    #[arg(long, env = "MP4_CRF", default_value_t = 28)]
    mp4_crf: u8,

    /// Encoder threads for .webm files
    #[arg(long, env = "WEBM_THREADS", default_value_t = 4)]
    webm_threads: usize,

    /// Dry run - don't invoke the encoder or modify files
    #[arg(long, env = "DRY_RUN", value_parser = clap::builder::FalseyValueParser::new())]
    dry_run: bool,

    /// Encoder binary, name or path
    #[arg(long, env = "VIDEO_SHRINKER_ENCODER", default_value = "ffmpeg")]
    encoder: String,

    /// Files smaller than this many bytes are skipped
    #[arg(long, env = "VIDEO_SHRINKER_MIN_SIZE", default_value_t = DEFAULT_MIN_SIZE)]
    min_size: u64,

    /// Reduction, in percent, the re-encode must strictly exceed
    #[arg(long = "min-reduction", env = "VIDEO_SHRINKER_MIN_REDUCTION", default_value_t = 5)]
    min_reduction_percent: u8,

    /// Emit newline-delimited JSON instead of text lines
    #[arg(long)]
    json: bool,

    /// Never draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let roots = if self.roots.is_empty() {
            let base_dir = match self.base_dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            Config::default_roots(&base_dir)
        } else {
            self.roots
        };

        Ok(Config {
            roots,
            webm_crf: self.webm_crf,
            mp4_crf: self.mp4_crf,
            webm_threads: self.webm_threads,
            dry_run: self.dry_run,
            encoder: self.encoder,
            min_size: self.min_size,
            min_reduction_percent: self.min_reduction_percent,
            json_output: self.json,
            show_progress: !self.no_progress,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the verbose flag
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(
        "Running on {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let config = args.into_config()?;
    let shrinker = VideoShrinker::new(config)?;
    shrinker.run();

    Ok(())
}
