//! # Video Processing Module
//!
//! Questo modulo gestisce la ricodifica dei video e il confronto delle dimensioni.
//!
//! ## Responsabilità:
//! - Selezione dei parametri codec in base al container (WebM / MP4)
//! - Invocazione dell'encoder esterno tramite il trait `Encoder`
//! - Gestione del file temporaneo con cleanup garantito (`TempOutput`)
//! - Confronto dimensioni e sostituzione dell'originale
//!
//! ## Parametri di codifica:
//! - **WebM**: VP9 a qualità costante (`-crf`, default 32), multi-thread,
//!   audio Opus a 96k
//! - **MP4**: H.264 preset `veryslow` a qualità costante (`-crf`, default 28),
//!   audio AAC a 128k
//!
//! ## Pipeline per file:
//! 1. Legge la dimensione attuale; sotto `min_size` il file è `SkippedTiny`
//! 2. Acquisisce il percorso temporaneo `<originale>.shrink-tmp.<ext>`
//! 3. Esegue l'encoder e attende l'exit code (saltato in dry run)
//! 4. Miglioramento solo se il nuovo file è più piccolo di oltre il 5%
//! 5. Copia il temporaneo sull'originale (mai in dry run)
//! 6. Il temporaneo viene rimosso quando la guardia esce dallo scope
//!
//! ## Esempio:
//! ```rust,no_run
//! use std::path::Path;
//! use video_shrinker::{Config, FfmpegEncoder, VideoProcessor};
//!
//! let config = Config::default();
//! let processor = VideoProcessor::new(config.clone(), FfmpegEncoder::from_config(&config));
//! let result = processor.process(Path::new("assets/intro.webm"))?;
//! println!("{} -> {}", result.size_before, result.size_after);
//! # Ok::<(), video_shrinker::ShrinkError>(())
//! ```

use crate::config::Config;
use crate::error::ShrinkError;
use crate::file_manager::FileManager;
use crate::platform;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

/// Marker inserted between the original path and the temporary extension
pub const TEMP_MARKER: &str = "shrink-tmp";

/// Container formats the encoder knows how to re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    WebM,
    Mp4,
}

impl VideoFormat {
    /// Detect the format from the file extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "webm" => Some(Self::WebM),
            "mp4" => Some(Self::Mp4),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }

    /// Codec selection and rate control for this container
    pub fn codec_args(self, config: &Config) -> Vec<String> {
        match self {
            Self::WebM => vec![
                "-c:v".to_string(),
                "libvpx-vp9".to_string(),
                "-crf".to_string(),
                config.webm_crf.to_string(),
                "-b:v".to_string(),
                "0".to_string(),
                "-row-mt".to_string(),
                "1".to_string(),
                "-threads".to_string(),
                config.webm_threads.to_string(),
                "-c:a".to_string(),
                "libopus".to_string(),
                "-b:a".to_string(),
                "96k".to_string(),
            ],
            Self::Mp4 => vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "veryslow".to_string(),
                "-crf".to_string(),
                config.mp4_crf.to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                "128k".to_string(),
            ],
        }
    }
}

/// Sibling path the re-encoded copy of `path` is written to
pub fn temp_output_path(path: &Path, format: VideoFormat) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.{}", TEMP_MARKER, format.extension()));
    PathBuf::from(name)
}

/// Whether `path` is a temporary output left by this tool
pub fn is_temp_output(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(&format!(".{}.", TEMP_MARKER)))
        .unwrap_or(false)
}

/// Improvement requires a strictly smaller file whose reduction strictly
/// exceeds `min_reduction_percent` of the original.
pub fn is_improvement(size_before: u64, size_after: u64, min_reduction_percent: u8) -> bool {
    if size_after >= size_before {
        return false;
    }
    let saved = u128::from(size_before - size_after);
    saved * 100 > u128::from(size_before) * u128::from(min_reduction_percent)
}

/// Owns the temporary output path for one candidate and deletes the file on drop.
///
/// Acquiring the path removes any stale file an interrupted run left there.
pub struct TempOutput {
    path: PathBuf,
}

impl TempOutput {
    pub fn acquire(path: PathBuf) -> io::Result<Self> {
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed stale temporary file: {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the temporary file, `None` if nothing was written
    pub fn size(&self) -> io::Result<Option<u64>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary file: {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Produces a re-encoded copy of `input` at `output`, blocking until done
pub trait Encoder {
    fn encode(&self, input: &Path, output: &Path, format: VideoFormat) -> Result<(), ShrinkError>;
}

/// Runs ffmpeg (or a compatible binary) as a child process
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    config: Config,
}

impl FfmpegEncoder {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: platform::encoder_program(&config.encoder),
            config: config.clone(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for one invocation
    pub fn build_args(&self, input: &Path, output: &Path, format: VideoFormat) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(format.codec_args(&self.config).into_iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, input: &Path, output: &Path, format: VideoFormat) -> Result<(), ShrinkError> {
        let args = self.build_args(input, output, format);
        debug!("Running {} {:?}", self.program.display(), args);

        let start_time = Instant::now();
        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ShrinkError::encode_failed(
                    input,
                    format!("failed to launch {}: {}", self.program.display(), e),
                )
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let reason = match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
                Some(last) => format!("{} ({})", result.status, last.trim()),
                None => result.status.to_string(),
            };
            return Err(ShrinkError::encode_failed(input, reason));
        }

        debug!(
            "Encoded {} in {:.1}s",
            input.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

/// What happened to a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Below the minimum size, encoder never invoked
    SkippedTiny,
    /// Re-encode was small enough to replace the original
    Improved,
    /// Re-encode was not worth keeping
    Unchanged,
}

/// Per-candidate result record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeResult {
    pub path: PathBuf,
    pub size_before: u64,
    /// Equal to `size_before` unless improved
    pub size_after: u64,
    pub outcome: Outcome,
}

impl EncodeResult {
    fn unchanged(path: &Path, size: u64, outcome: Outcome) -> Self {
        Self {
            path: path.to_path_buf(),
            size_before: size,
            size_after: size,
            outcome,
        }
    }

    pub fn improved(&self) -> bool {
        self.outcome == Outcome::Improved
    }

    pub fn skipped(&self) -> bool {
        self.outcome == Outcome::SkippedTiny
    }

    pub fn bytes_saved(&self) -> u64 {
        if self.improved() {
            self.size_before.saturating_sub(self.size_after)
        } else {
            0
        }
    }
}

/// Handles encode-and-compare for single candidates
pub struct VideoProcessor<E> {
    config: Config,
    encoder: E,
}

impl<E: Encoder> VideoProcessor<E> {
    pub fn new(config: Config, encoder: E) -> Self {
        Self { config, encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Re-encode one candidate and keep the result if it is an improvement
    pub fn process(&self, path: &Path) -> Result<EncodeResult, ShrinkError> {
        let format = VideoFormat::from_path(path)
            .ok_or_else(|| ShrinkError::UnsupportedFormat(path.display().to_string()))?;

        let size_before = FileManager::file_size(path)?;
        if size_before < self.config.min_size {
            debug!(
                "Skipping {}: {} bytes is below {}",
                path.display(),
                size_before,
                self.config.min_size
            );
            return Ok(EncodeResult::unchanged(path, size_before, Outcome::SkippedTiny));
        }

        let temp = TempOutput::acquire(temp_output_path(path, format))?;

        if self.config.dry_run {
            debug!("Dry run, encoder not invoked for {}", path.display());
        } else {
            self.encoder.encode(path, temp.path(), format)?;
        }

        let size_after = temp.size()?.unwrap_or(size_before);
        if !is_improvement(size_before, size_after, self.config.min_reduction_percent) {
            return Ok(EncodeResult::unchanged(path, size_before, Outcome::Unchanged));
        }

        if !self.config.dry_run {
            FileManager::replace_file(path, temp.path())?;
        }

        Ok(EncodeResult {
            path: path.to_path_buf(),
            size_before,
            size_after,
            outcome: Outcome::Improved,
        })
    }
}
