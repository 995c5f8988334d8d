//! # Video Shrinker Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `file_manager`: Attraversamento directory e riconoscimento candidati
//! - `video_processor`: Ricodifica e confronto dimensioni
//! - `optimizer`: Orchestratore principale della run
//! - `progress`: Progress bar e riepilogo
//! - `json_output`: Output JSON per uso programmatico
//! - `platform`: Risoluzione del binario dell'encoder
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use std::path::Path;
//! use video_shrinker::{Config, VideoShrinker};
//!
//! let config = Config {
//!     roots: Config::default_roots(Path::new(".")),
//!     dry_run: true,
//!     ..Config::default()
//! };
//! let summary = VideoShrinker::new(config)?.run();
//! assert_eq!(summary.errors, 0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod video_processor;

pub use config::Config;
pub use error::ShrinkError;
pub use optimizer::VideoShrinker;
pub use progress::RunSummary;
pub use video_processor::{EncodeResult, Encoder, FfmpegEncoder, Outcome, VideoFormat, VideoProcessor};
