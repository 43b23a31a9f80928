//! Boardmerge Core - Board description discovery and merging
//!
//! This crate provides the pipeline behind the `boardmerge` tools:
//! - Bounded, symlink-safe discovery of JSON files under a directory
//! - Board record decoding that keeps unknown fields intact
//! - Merge engine that deduplicates boards by `(vendor, name)`
//! - Catalog assembly with deterministic ordering and vendor statistics
//! - Reporter hooks so callers decide whether and how events are logged

pub mod board;
pub mod catalog;
pub mod merge;
pub mod report;
pub mod scanner;

use std::path::Path;

use thiserror::Error;

pub use board::{decode_boards, Board, BoardError, WifiSupport};
pub use catalog::{BoardCatalog, CatalogMetadata};
pub use merge::{identity_key, merge_all, BoardRegistry, MergeError};
pub use report::{NullReporter, PipelineEvent, Reporter, TracingReporter};
pub use scanner::{scan, ScanError, ScanOptions, DEFAULT_MAX_DEPTH};

/// Fatal pipeline errors surfaced to the top-level caller
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Scan `root` for board files and merge them into a catalog
pub fn scan_and_merge(
    root: &Path,
    options: ScanOptions,
    reporter: &dyn Reporter,
) -> Result<BoardCatalog, Error> {
    let files = scan(root, options, reporter)?;
    let catalog = merge_all(&files, reporter)?;
    Ok(catalog)
}
