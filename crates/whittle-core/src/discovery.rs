//! Script file discovery
//!
//! Command-line paths are either files, taken as given, or directories, walked
//! recursively for files with a configured extension. Exclude globs are
//! matched against the path relative to the directory being walked.

use crate::config::FilesConfig;
use crate::{Result, WhittleError};
use glob::Pattern;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Expand `paths` into the script files they name, in a stable order
pub fn discover_files(paths: &[PathBuf], config: &FilesConfig) -> Result<Vec<PathBuf>> {
    let excludes = config
        .exclude
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                WhittleError::config_error(format!("Invalid exclude pattern '{p}': {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            if seen.insert(path.clone()) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for file in walk_directory(path, &config.extensions, &excludes) {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        } else {
            return Err(WhittleError::io_error(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    }

    info!("Discovered {} script files", files.len());
    debug!("Files: {:?}", files);
    Ok(files)
}

/// Whether `path` has one of `extensions`, compared case-insensitively
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.to_lowercase() == ext))
}

fn walk_directory(root: &Path, extensions: &[String], excludes: &[Pattern]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            let relative = relative.to_string_lossy();
            !excludes.iter().any(|pattern| pattern.matches(&relative))
        })
        .collect()
}
