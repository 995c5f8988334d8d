//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore della libreria.
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (lettura dimensione, sostituzione file)
//! - `EncodeFailed`: L'encoder esterno non parte o termina con exit code != 0
//! - `UnsupportedFormat`: Estensione non riconosciuta come video
//! - `Validation`: Parametri di configurazione non validi
//!
//! Un file troppo piccolo non è un errore: è un esito (`Outcome::SkippedTiny`).
//!
//! ## Esempio:
//! ```rust
//! use video_shrinker::ShrinkError;
//!
//! let err = ShrinkError::encode_failed("clip.webm", "exit status: 1");
//! assert!(err.is_encode_failure());
//! ```

use std::path::Path;

/// Errors produced while shrinking a single file or validating configuration
#[derive(thiserror::Error, Debug)]
pub enum ShrinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode failed for {path}: {reason}")]
    EncodeFailed { path: String, reason: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl ShrinkError {
    pub fn encode_failed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::EncodeFailed {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_encode_failure(&self) -> bool {
        matches!(self, Self::EncodeFailed { .. })
    }
}
