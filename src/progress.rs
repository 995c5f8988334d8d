//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e il riepilogo della run.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Barra di progresso `indicatif` e stampa delle righe per file
//! - `RunSummary`: Contatori cumulativi (file migliorati, byte risparmiati, errori)
//!
//! ## Output:
//! ```text
//! ✅ assets/intro.webm: 1.00 MB -> 0.90 MB (improved)
//! ➖ assets/loop.mp4: 0.50 MB -> 0.50 MB (unchanged)
//! Improved 1 of 2 files, saved 0.10 MB (skipped: 0, errors: 0)
//! ```
//!
//! La barra è nascosta se stdout non è un terminale: in quel caso le righe
//! vengono stampate direttamente.

use crate::file_manager::FileManager;
use crate::video_processor::{EncodeResult, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Manages progress reporting for a shrink run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager, drawn only when `visible` and on a terminal
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Show which file is being encoded
    pub fn start_file(&self, path: &Path) {
        self.bar.set_message(
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
        );
    }

    /// Print a line above the bar and advance it
    pub fn update(&self, line: &str) {
        self.println(line);
        self.bar.inc(1);
    }

    /// Advance without printing
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Print a line without advancing
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    /// Clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Statistics accumulated across all candidates of a run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_improved: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub bytes_saved: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &EncodeResult) {
        self.files_processed += 1;
        match result.outcome {
            Outcome::Improved => {
                self.files_improved += 1;
                self.bytes_saved += result.bytes_saved();
            }
            Outcome::SkippedTiny => self.files_skipped += 1,
            Outcome::Unchanged => {}
        }
    }

    pub fn record_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Improved {} of {} files, saved {} (skipped: {}, errors: {})",
            self.files_improved,
            self.files_processed,
            FileManager::format_mb(self.bytes_saved),
            self.files_skipped,
            self.errors
        )
    }
}

/// One console line for a processed file
pub fn format_result_line(result: &EncodeResult) -> String {
    let (icon, label) = match result.outcome {
        Outcome::Improved => ("✅", "improved"),
        Outcome::Unchanged => ("➖", "unchanged"),
        Outcome::SkippedTiny => ("⏩", "skipped: tiny"),
    };
    format!(
        "{} {}: {} -> {} ({})",
        icon,
        result.path.display(),
        FileManager::format_mb(result.size_before),
        FileManager::format_mb(result.size_after),
        label
    )
}
