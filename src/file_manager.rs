//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery dei video.
//!
//! ## Responsabilità:
//! - Attraversamento ricorsivo e lazy delle directory radice (`TreeWalker`)
//! - Esclusione delle directory di version control, dipendenze e tool
//! - Riconoscimento dei file video candidati
//! - Lettura dimensione e sostituzione atomica del contenuto dei file
//!   (copia in un file di staging, poi rename sull'originale)
//! - Formattazione delle dimensioni in MB
//!
//! ## Directory escluse:
//! - Prefissi VCS: `.git`, `.hg`, `.svn`
//! - Cache dipendenze: `node_modules`
//! - Tooling: `tools`
//!
//! Una radice inesistente o non leggibile non produce alcun file, senza errori.
//!
//! ## Esempio:
//! ```rust
//! use std::path::PathBuf;
//! use video_shrinker::file_manager::FileManager;
//!
//! let roots = vec![PathBuf::from("assets")];
//! for video in FileManager::find_videos(&roots) {
//!     println!("{}", video.display());
//! }
//! ```

use crate::video_processor::{is_temp_output, VideoFormat};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, FilterEntry, WalkDir};

const VCS_PREFIXES: &[&str] = &[".git", ".hg", ".svn"];
const PRUNED_NAMES: &[&str] = &["node_modules", "tools"];

/// Prefix of the staging file an improved encode is renamed from
const STAGE_PREFIX: &str = ".shrink-stage.";

/// Whether a directory with this name is skipped along with everything below it
pub fn is_pruned_dir(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    VCS_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
        || PRUNED_NAMES.contains(&&*name)
}

fn keep_entry(entry: &DirEntry) -> bool {
    // The root is always walked, whatever its name
    entry.depth() == 0 || !(entry.file_type().is_dir() && is_pruned_dir(entry.file_name()))
}

/// Depth-first, lazy iterator over every regular file below a root directory.
///
/// A root that is missing, unreadable or not a directory yields nothing.
pub struct TreeWalker {
    inner: Option<FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>>,
}

impl TreeWalker {
    pub fn new(root: &Path) -> Self {
        if !root.is_dir() {
            debug!("Not a directory, nothing to walk: {}", root.display());
            return Self { inner: None };
        }

        let inner = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(keep_entry as fn(&DirEntry) -> bool);
        Self { inner: Some(inner) }
    }
}

impl Iterator for TreeWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let inner = self.inner.as_mut()?;
        loop {
            match inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(entry.into_path()),
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            }
        }
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Lazily yield every candidate video under the given roots, root by root
    pub fn find_videos(roots: &[PathBuf]) -> impl Iterator<Item = PathBuf> + '_ {
        roots
            .iter()
            .flat_map(|root| TreeWalker::new(root))
            .filter(|path| Self::is_video(path))
    }

    /// Check if a file is a video candidate
    pub fn is_video(path: &Path) -> bool {
        VideoFormat::from_path(path).is_some() && !is_temp_output(path)
    }

    /// Current size of a file, read straight from the filesystem
    pub fn file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    /// Atomically overwrite `original` with the contents of `replacement`.
    ///
    /// The contents are copied into a uniquely named staging file next to the
    /// original, synced, then renamed over it. `replacement` is left in place
    /// and `original` is untouched if any step fails.
    pub fn replace_file(original: &Path, replacement: &Path) -> io::Result<()> {
        let parent = match original.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = fs::metadata(original)?.permissions();

        let mut staged = tempfile::Builder::new()
            .prefix(STAGE_PREFIX)
            .tempfile_in(parent)?;
        let mut source = File::open(replacement)?;
        io::copy(&mut source, staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        fs::set_permissions(staged.path(), permissions)?;

        // On failure the staging file is dropped and removed
        staged.persist(original).map_err(|e| e.error)?;
        Ok(())
    }

    /// Size in megabytes with two decimals
    pub fn format_mb(size: u64) -> String {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_pruned_dir_names() {
        assert!(is_pruned_dir(OsStr::new(".git")));
        assert!(is_pruned_dir(OsStr::new(".github")));
        assert!(is_pruned_dir(OsStr::new(".svn")));
        assert!(is_pruned_dir(OsStr::new("node_modules")));
        assert!(is_pruned_dir(OsStr::new("tools")));
        assert!(!is_pruned_dir(OsStr::new("videos")));
        assert!(!is_pruned_dir(OsStr::new("toolsets")));
    }

    #[test]
    fn test_walker_prunes_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.webm"));
        touch(&root.join("nested/deep/b.mp4"));
        touch(&root.join(".git/objects/c.webm"));
        touch(&root.join("node_modules/pkg/d.mp4"));
        touch(&root.join("tools/e.webm"));
        touch(&root.join("nested/node_modules/f.mp4"));

        let mut found: Vec<PathBuf> = TreeWalker::new(root)
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        found.sort();

        assert_eq!(
            found,
            vec![PathBuf::from("a.webm"), PathBuf::from("nested/deep/b.mp4")]
        );
    }

    #[test]
    fn test_walker_root_named_like_pruned_dir_is_walked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tools");
        touch(&root.join("clip.webm"));

        assert_eq!(TreeWalker::new(&root).count(), 1);
    }

    #[test]
    fn test_walker_file_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.webm");
        touch(&file);

        assert_eq!(TreeWalker::new(&file).count(), 0);
        assert_eq!(FileManager::find_videos(&[file]).count(), 0);
    }

    #[test]
    fn test_walker_missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TreeWalker::new(&dir.path().join("missing")).count(), 0);
    }

    #[test]
    fn test_is_video() {
        assert!(FileManager::is_video(Path::new("intro.webm")));
        assert!(FileManager::is_video(Path::new("INTRO.MP4")));
        assert!(FileManager::is_video(Path::new("dir/clip.WebM")));
        assert!(!FileManager::is_video(Path::new("poster.png")));
        assert!(!FileManager::is_video(Path::new("noext")));
        assert!(!FileManager::is_video(Path::new("clip.webm.shrink-tmp.webm")));
    }

    #[test]
    fn test_find_videos_across_roots() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        let public = dir.path().join("public");
        touch(&assets.join("a.webm"));
        touch(&assets.join("readme.txt"));
        touch(&public.join("b.mp4"));

        let roots = vec![assets, dir.path().join("missing"), public];
        assert_eq!(FileManager::find_videos(&roots).count(), 2);
    }

    fn stage_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with(STAGE_PREFIX))
            .collect()
    }

    #[test]
    fn test_replace_file() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.mp4");
        let replacement = dir.path().join("clip.mp4.shrink-tmp.mp4");
        fs::write(&original, b"original contents").unwrap();
        fs::write(&replacement, b"smaller").unwrap();

        FileManager::replace_file(&original, &replacement).unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"smaller");
        assert!(replacement.exists());
        assert!(stage_files(dir.path()).is_empty());
    }

    #[test]
    fn test_replace_file_leaves_neighbours_alone() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.mp4");
        let replacement = dir.path().join("clip.mp4.shrink-tmp.mp4");
        let neighbour = dir.path().join("clip.mp4.backup");
        fs::write(&original, b"original contents").unwrap();
        fs::write(&replacement, b"smaller").unwrap();
        fs::write(&neighbour, b"USER DATA").unwrap();

        FileManager::replace_file(&original, &replacement).unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"smaller");
        assert_eq!(fs::read(&neighbour).unwrap(), b"USER DATA");
    }

    #[test]
    fn test_replace_file_missing_replacement_keeps_original() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.webm");
        fs::write(&original, b"original contents").unwrap();

        let result = FileManager::replace_file(&original, &dir.path().join("gone.webm"));

        assert!(result.is_err());
        assert_eq!(fs::read(&original).unwrap(), b"original contents");
        assert!(stage_files(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_failed_rename_cleans_up() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.webm");
        fs::create_dir(&original).unwrap();
        fs::write(original.join("inside.txt"), b"keep").unwrap();
        let replacement = dir.path().join("clip.webm.shrink-tmp.webm");
        fs::write(&replacement, b"smaller").unwrap();

        let result = FileManager::replace_file(&original, &replacement);

        assert!(result.is_err());
        assert_eq!(fs::read(original.join("inside.txt")).unwrap(), b"keep");
        assert_eq!(fs::read(&replacement).unwrap(), b"smaller");
        assert!(stage_files(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.mp4");
        let replacement = dir.path().join("clip.mp4.shrink-tmp.mp4");
        fs::write(&original, b"original contents").unwrap();
        fs::write(&replacement, b"smaller").unwrap();
        fs::set_permissions(&original, fs::Permissions::from_mode(0o644)).unwrap();

        FileManager::replace_file(&original, &replacement).unwrap();

        let mode = fs::metadata(&original).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_format_mb() {
        assert_eq!(FileManager::format_mb(1024 * 1024), "1.00 MB");
        assert_eq!(FileManager::format_mb(0), "0.00 MB");
        assert_eq!(FileManager::format_mb(1_572_864), "1.50 MB");
    }

}
