//! Directory scanner that collects board files
//!
//! The walk never follows symbolic links, the root included, and never
//! leaves the depth budget it was given. Depth is relative to the scan root: 0 keeps the walk in the
//! root directory, N allows N levels of subdirectories below it.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::report::{PipelineEvent, Reporter};

/// Depth limit used when recursion is enabled without an explicit limit
pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },
    #[error("no JSON files found in {}", .0.display())]
    NoFilesFound(PathBuf),
}

/// How far the scanner may descend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Descend into subdirectories at all
    pub recursive: bool,
    /// Levels of subdirectories allowed below the root when recursive
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ScanOptions {
    pub fn flat() -> Self {
        Self {
            recursive: false,
            max_depth: 0,
        }
    }

    pub fn recursive(max_depth: usize) -> Self {
        Self {
            recursive: true,
            max_depth,
        }
    }

    /// Depth limit actually applied, 0 whenever recursion is off
    pub fn effective_depth(&self) -> usize {
        if self.recursive {
            self.max_depth
        } else {
            0
        }
    }
}

/// Collect absolute paths of `*.json` files under `path`
///
/// Files come back in walk order, which is lexical by file name within each
/// directory. Unreadable entries and symbolic links are reported and
/// skipped; only an invalid root or an empty result is an error.
pub fn scan(path: &Path, options: ScanOptions, reporter: &dyn Reporter) -> Result<Vec<PathBuf>, ScanError> {
    let root = std::path::absolute(path).map_err(|e| ScanError::InvalidPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let metadata = std::fs::metadata(&root).map_err(|e| ScanError::InvalidPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    reporter.report(PipelineEvent::ScanStarted { root: root.clone() });

    let is_link = std::fs::symlink_metadata(&root).is_ok_and(|m| m.file_type().is_symlink());
    if is_link {
        reporter.report(PipelineEvent::SymlinkSkipped { path: root });
        return Err(ScanError::NoFilesFound(path.to_path_buf()));
    }

    if !options.recursive && options.max_depth > 0 {
        reporter.report(PipelineEvent::DepthReset {
            requested: options.max_depth,
        });
    }
    let max_depth = options.effective_depth();

    let mut files = Vec::new();
    let mut walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                reporter.report(PipelineEvent::PathSkipped {
                    path: e.path().map(Path::to_path_buf),
                    error: e.to_string(),
                });
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        if entry.path_is_symlink() {
            reporter.report(PipelineEvent::SymlinkSkipped {
                path: entry.path().to_path_buf(),
            });
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if entry.depth() > max_depth {
                reporter.report(PipelineEvent::DirectoryPruned {
                    path: entry.path().to_path_buf(),
                    depth: entry.depth(),
                });
                walker.skip_current_dir();
            }
            continue;
        }

        if file_type.is_file() && has_json_extension(entry.path()) {
            let file = entry.into_path();
            reporter.report(PipelineEvent::JsonFileFound { path: file.clone() });
            files.push(file);
        }
    }

    if files.is_empty() {
        return Err(ScanError::NoFilesFound(path.to_path_buf()));
    }

    Ok(files)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
