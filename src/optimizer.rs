//! # Main Optimizer Orchestrator Module
//!
//! Questo è il modulo che orchestra l'intero processo di ricodifica.
//!
//! ## Flusso di esecuzione:
//! 1. **Discovery**: Raccoglie i candidati da tutte le radici configurate
//! 2. **Report iniziale**: Stampa il numero di video trovati
//! 3. **Processing sequenziale**: Un file alla volta, attesa bloccante dell'encoder
//! 4. **Report per file**: Una riga per ogni file elaborato
//! 5. **Riepilogo**: File migliorati e byte risparmiati
//!
//! ## Error handling:
//! - Gli errori di un singolo file vengono loggati come warning e contati
//! - Nessun errore per file interrompe la run
//! - Una radice mancante contribuisce zero candidati
//!
//! ## Esempio:
//! ```rust,no_run
//! use video_shrinker::{Config, VideoShrinker};
//!
//! let shrinker = VideoShrinker::new(Config::default())?;
//! let summary = shrinker.run();
//! println!("{}", summary.format_summary());
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::{
    config::Config,
    file_manager::FileManager,
    json_output::JsonMessage,
    platform,
    progress::{format_result_line, ProgressManager, RunSummary},
    video_processor::{Encoder, FfmpegEncoder, VideoProcessor},
};
use anyhow::Result;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main orchestrator: walk, filter, encode-and-compare, report
pub struct VideoShrinker<E = FfmpegEncoder> {
    config: Config,
    processor: VideoProcessor<E>,
}

impl VideoShrinker<FfmpegEncoder> {
    /// Create a shrinker driving the configured ffmpeg binary
    pub fn new(config: Config) -> Result<Self> {
        let encoder = FfmpegEncoder::from_config(&config);
        Self::with_encoder(config, encoder)
    }
}

impl<E: Encoder> VideoShrinker<E> {
    pub fn with_encoder(config: Config, encoder: E) -> Result<Self> {
        config.validate()?;
        let processor = VideoProcessor::new(config.clone(), encoder);
        Ok(Self { config, processor })
    }

    /// Collect every candidate under the configured roots
    pub fn discover(&self) -> Vec<PathBuf> {
        for root in &self.config.roots {
            if !root.is_dir() {
                debug!("Root not found, skipping: {}", root.display());
            }
        }
        FileManager::find_videos(&self.config.roots).collect()
    }

    /// Process every candidate once, in order, and return the run summary
    pub fn run(&self) -> RunSummary {
        let start_time = Instant::now();
        self.log_configuration();

        let files = self.discover();
        let mut summary = RunSummary::new();

        if self.config.json_output {
            JsonMessage::Start {
                total_files: files.len(),
                config: self.config.clone(),
            }
            .emit();
        } else {
            println!("Found {} video files", files.len());
        }

        let show_bar = self.config.show_progress
            && !self.config.json_output
            && std::io::stdout().is_terminal();
        let progress = ProgressManager::new(files.len() as u64, show_bar);

        for path in files {
            progress.start_file(&path);

            match self.processor.process(&path) {
                Ok(result) => {
                    summary.record(&result);
                    if self.config.json_output {
                        JsonMessage::file_complete(&result).emit();
                        progress.advance();
                    } else {
                        progress.update(&format_result_line(&result));
                    }
                }
                Err(e) => {
                    summary.record_error();
                    warn!("Failed to shrink {}: {}", path.display(), e);
                    if self.config.json_output {
                        let size = FileManager::file_size(&path).unwrap_or(0);
                        JsonMessage::file_error(path.clone(), size, e.to_string()).emit();
                    }
                    progress.advance();
                }
            }
        }

        progress.finish();

        if self.config.json_output {
            JsonMessage::Complete {
                summary: summary.clone(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            }
            .emit();
        } else {
            println!("{}", summary.format_summary());
        }

        info!(
            "Run finished in {:.1}s",
            start_time.elapsed().as_secs_f64()
        );
        summary
    }

    fn log_configuration(&self) {
        for root in &self.config.roots {
            info!("📁 Root: {}", root.display());
        }
        info!(
            "🎬 WebM CRF: {} ({} threads), MP4 CRF: {}",
            self.config.webm_crf, self.config.webm_threads, self.config.mp4_crf
        );
        if self.config.dry_run {
            info!("🧪 Dry run mode: No files will be modified");
        } else if platform::resolve_encoder(&self.config.encoder).is_none() {
            warn!(
                "Encoder '{}' not found, every candidate above the size threshold will fail",
                self.config.encoder
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShrinkError;
    use crate::video_processor::VideoFormat;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Shrinks every input to 90% and fails on file names containing `broken`
    struct ScriptedEncoder;

    impl Encoder for ScriptedEncoder {
        fn encode(&self, input: &Path, output: &Path, _format: VideoFormat) -> Result<(), ShrinkError> {
            let name = input.file_name().unwrap_or_default().to_string_lossy();
            if name.contains("broken") {
                return Err(ShrinkError::encode_failed(input, "exit status: 1"));
            }
            let size = fs::metadata(input)?.len();
            fs::write(output, vec![0u8; (size * 90 / 100) as usize])?;
            Ok(())
        }
    }

    fn config_for(root: &Path) -> Config {
        Config {
            roots: vec![root.to_path_buf()],
            show_progress: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            webm_threads: 0,
            ..Config::default()
        };
        assert!(VideoShrinker::with_encoder(config, ScriptedEncoder).is_err());
    }

    #[test]
    fn test_failure_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_broken.webm"), vec![1u8; 300_000]).unwrap();
        fs::write(dir.path().join("b_good.webm"), vec![1u8; 300_000]).unwrap();

        let shrinker = VideoShrinker::with_encoder(config_for(dir.path()), ScriptedEncoder).unwrap();
        let summary = shrinker.run();

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.files_improved, 1);
        assert_eq!(summary.bytes_saved, 30_000);
        assert_eq!(fs::read(dir.path().join("a_broken.webm")).unwrap().len(), 300_000);
    }

    #[test]
    fn test_missing_roots_contribute_nothing() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            roots: vec![dir.path().join("assets"), dir.path().join("public")],
            show_progress: false,
            ..Config::default()
        };

        let shrinker = VideoShrinker::with_encoder(config, ScriptedEncoder).unwrap();
        assert!(shrinker.discover().is_empty());
        assert_eq!(shrinker.run(), RunSummary::default());
    }

    #[test]
    fn test_pruned_videos_are_not_counted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join(".git/hidden.webm"), vec![1u8; 300_000]).unwrap();
        fs::write(dir.path().join("node_modules/pkg/demo.mp4"), vec![1u8; 300_000]).unwrap();
        fs::write(dir.path().join("visible.webm"), vec![1u8; 300_000]).unwrap();

        let shrinker = VideoShrinker::with_encoder(config_for(dir.path()), ScriptedEncoder).unwrap();

        assert_eq!(shrinker.discover(), vec![dir.path().join("visible.webm")]);
        assert_eq!(shrinker.run().files_processed, 1);
    }
}
