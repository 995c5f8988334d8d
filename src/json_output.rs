//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`) per chi
//! consuma il tool da script o pipeline CI.
//!
//! ## Tipi di messaggi:
//! - `start`: Numero di candidati e configurazione della run
//! - `file_complete`: Esito di un singolo file
//! - `complete`: Statistiche finali della run
//!
//! Un messaggio per riga su stdout.

use crate::config::Config;
use crate::progress::RunSummary;
use crate::video_processor::EncodeResult;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio della run
    Start {
        total_files: usize,
        config: Config,
    },

    /// Fine elaborazione di un file
    FileComplete {
        path: PathBuf,
        size_before: u64,
        size_after: u64,
        improved: bool,
        skipped: bool,
        error: Option<String>,
    },

    /// Run completata
    Complete {
        #[serde(flatten)]
        summary: RunSummary,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn file_complete(result: &EncodeResult) -> Self {
        Self::FileComplete {
            path: result.path.clone(),
            size_before: result.size_before,
            size_after: result.size_after,
            improved: result.improved(),
            skipped: result.skipped(),
            error: None,
        }
    }

    pub fn file_error(path: PathBuf, size: u64, error: String) -> Self {
        Self::FileComplete {
            path,
            size_before: size,
            size_after: size,
            improved: false,
            skipped: false,
            error: Some(error),
        }
    }
}
