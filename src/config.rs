//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ricodifica
//! - Fornisce valori di default per tutti i parametri
//! - Valida i parametri prima dell'avvio
//!
//! ## Parametri di configurazione:
//! - `roots`: Directory da scansionare (default: `assets` e `public` sotto la base)
//! - `webm_crf`: CRF per i file WebM (default: 32)
//! - `mp4_crf`: CRF per i file MP4 (default: 28)
//! - `webm_threads`: Thread per la codifica VP9 (default: 4)
//! - `dry_run`: Simulazione senza invocare l'encoder (default: false)
//! - `encoder`: Binario dell'encoder (default: `ffmpeg`)
//! - `min_size`: Dimensione minima in byte per tentare la ricodifica (default: 262144)
//! - `min_reduction_percent`: Riduzione minima richiesta, strettamente maggiore (default: 5)
//!
//! La configurazione viene costruita una volta in `main` e passata esplicitamente
//! all'orchestratore: non esistono costanti globali per i percorsi.

use crate::error::ShrinkError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory names searched under the base directory when no root is given
pub const DEFAULT_ROOT_NAMES: &[&str] = &["assets", "public"];

/// Files smaller than this are never handed to the encoder
pub const DEFAULT_MIN_SIZE: u64 = 262_144;

/// Configuration for a shrink run
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root directories searched recursively
    pub roots: Vec<PathBuf>,
    /// Constant-quality value for WebM (VP9) encodes
    pub webm_crf: u8,
    /// Constant-quality value for MP4 (H.264) encodes
    pub mp4_crf: u8,
    /// Encoder threads for WebM encodes
    pub webm_threads: usize,
    /// Evaluate without invoking the encoder or touching files
    pub dry_run: bool,
    /// Encoder binary, name or path
    pub encoder: String,
    /// Minimum size in bytes for a file to be re-encoded
    pub min_size: u64,
    /// Required reduction, in percent, that the new file must strictly exceed
    pub min_reduction_percent: u8,
    /// Emit newline-delimited JSON events instead of text lines
    pub json_output: bool,
    /// Show the progress bar when attached to a terminal
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            webm_crf: 32,
            mp4_crf: 28,
            webm_threads: 4,
            dry_run: false,
            encoder: "ffmpeg".to_string(),
            min_size: DEFAULT_MIN_SIZE,
            min_reduction_percent: 5,
            json_output: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// The fixed asset roots under `base_dir`
    pub fn default_roots(base_dir: &Path) -> Vec<PathBuf> {
        DEFAULT_ROOT_NAMES
            .iter()
            .map(|name| base_dir.join(name))
            .collect()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ShrinkError> {
        if self.webm_crf > 63 {
            return Err(ShrinkError::Validation(
                "WebM CRF must be between 0 and 63".to_string(),
            ));
        }

        // libx264 accepts up to 51 in 8-bit mode, 63 covers high bit depth builds
        if self.mp4_crf > 63 {
            return Err(ShrinkError::Validation(
                "MP4 CRF must be between 0 and 63".to_string(),
            ));
        }

        if self.webm_threads == 0 {
            return Err(ShrinkError::Validation(
                "Number of encoder threads must be greater than 0".to_string(),
            ));
        }

        if self.min_reduction_percent > 99 {
            return Err(ShrinkError::Validation(
                "Minimum reduction must be between 0 and 99 percent".to_string(),
            ));
        }

        if self.encoder.trim().is_empty() {
            return Err(ShrinkError::Validation(
                "Encoder command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
