//! # Platform-specific utilities
//!
//! Resolves the encoder binary across platforms: bare names get the platform
//! executable suffix and are looked up on `PATH`, explicit paths are used as
//! given.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXE_SUFFIX: &str = if cfg!(windows) { ".exe" } else { "" };

/// Get the platform-specific command name
pub fn command_name(base_name: &str) -> String {
    if cfg!(windows) && Path::new(base_name).extension().is_none() {
        format!("{}{}", base_name, EXE_SUFFIX)
    } else {
        base_name.to_string()
    }
}

fn is_explicit_path(command: &str) -> bool {
    Path::new(command).components().count() > 1
}

/// Find a command in the directories listed in `PATH`
pub fn find_in_path(command: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}

/// Resolve the encoder to an existing file, if there is one
pub fn resolve_encoder(encoder: &str) -> Option<PathBuf> {
    if is_explicit_path(encoder) {
        let path = PathBuf::from(encoder);
        return path.is_file().then_some(path);
    }

    let resolved = find_in_path(&command_name(encoder));
    debug!("Resolved encoder {} -> {:?}", encoder, resolved);
    resolved
}

/// The program handed to `Command::new` for the configured encoder
pub fn encoder_program(encoder: &str) -> PathBuf {
    resolve_encoder(encoder).unwrap_or_else(|| PathBuf::from(command_name(encoder)))
}
