//! Pipeline events and the reporters that consume them
//!
//! The scanner and merge engine never log directly. Every recoverable
//! condition is described as a [`PipelineEvent`] and handed to the
//! [`Reporter`] the caller supplied, so a run can be silent
//! ([`NullReporter`]), logged ([`TracingReporter`]), or inspected.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Something worth telling the caller about while scanning or merging
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Directory walk started at this absolute root
    ScanStarted { root: PathBuf },
    /// A depth limit was given without recursion and was reset to 0
    DepthReset { requested: usize },
    /// Symbolic link skipped without following it
    SymlinkSkipped { path: PathBuf },
    /// Directory below the depth limit, not descended
    DirectoryPruned { path: PathBuf, depth: usize },
    /// Path that could not be visited during the walk
    PathSkipped { path: Option<PathBuf>, error: String },
    /// JSON file selected for merging
    JsonFileFound { path: PathBuf },
    /// File about to be decoded
    FileParsing { path: PathBuf },
    /// File could not be read and was skipped
    FileReadFailed { path: PathBuf, error: String },
    /// File content could not be decoded and was skipped
    FileDecodeFailed { path: PathBuf, error: String },
    /// No `boards` list, decoding the whole document as one board
    SingleBoardFallback,
    /// One entry of a `boards` list was invalid and was skipped
    BoardSkipped { error: String },
    /// Board identity already in the registry, merging into it
    DuplicateBoard { vendor: String, name: String },
    /// Both sides disagree on `core`, the existing value was kept
    CoreConflict {
        vendor: String,
        name: String,
        kept: String,
        rejected: String,
    },
    /// Both sides disagree on `has_wifi`, the existing value was kept
    WifiConflict {
        vendor: String,
        name: String,
        kept: bool,
    },
    /// Two boards filed under one key could not be merged
    MergeFailed { key: String, error: String },
}

/// Sink for pipeline events
pub trait Reporter: Send + Sync {
    fn report(&self, event: PipelineEvent);
}

/// Reporter that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: PipelineEvent) {}
}

/// Reporter that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::ScanStarted { root } => {
                info!(root = %root.display(), "Reading directory");
            }
            PipelineEvent::DepthReset { requested } => {
                warn!(
                    requested,
                    "Max depth is set while recursion is disabled, using depth 0"
                );
            }
            PipelineEvent::SymlinkSkipped { path } => {
                warn!(path = %path.display(), "Skipping symbolic link");
            }
            PipelineEvent::DirectoryPruned { path, depth } => {
                debug!(path = %path.display(), depth, "Not descending past depth limit");
            }
            PipelineEvent::PathSkipped { path, error } => match path {
                Some(path) => warn!(path = %path.display(), %error, "Skipping path due to error"),
                None => warn!(%error, "Skipping path due to error"),
            },
            PipelineEvent::JsonFileFound { path } => {
                info!(path = %path.display(), "Found JSON file");
            }
            PipelineEvent::FileParsing { path } => {
                info!(path = %path.display(), "Parsing file");
            }
            PipelineEvent::FileReadFailed { path, error } => {
                error!(path = %path.display(), %error, "Failed to read file, skipping");
            }
            PipelineEvent::FileDecodeFailed { path, error } => {
                error!(path = %path.display(), %error, "Failed to decode file, skipping");
            }
            PipelineEvent::SingleBoardFallback => {
                debug!("No boards list found, parsing a single board object");
            }
            PipelineEvent::BoardSkipped { error } => {
                warn!(%error, "Skipping board due to parsing error");
            }
            PipelineEvent::DuplicateBoard { vendor, name } => {
                warn!(%vendor, %name, "Found a duplicate board entry, merging");
            }
            PipelineEvent::CoreConflict {
                vendor,
                name,
                kept,
                rejected,
            } => {
                warn!(%vendor, %name, %kept, %rejected, "Conflicting 'core' values, keeping the first");
            }
            PipelineEvent::WifiConflict { vendor, name, kept } => {
                warn!(%vendor, %name, kept, "Conflicting 'has_wifi' values, keeping the first");
            }
            PipelineEvent::MergeFailed { key, error } => {
                error!(%key, %error, "Failed to merge duplicate board");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingReporter;
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::default();
        reporter.report(PipelineEvent::SingleBoardFallback);
        reporter.report(PipelineEvent::BoardSkipped {
            error: "missing".to_string(),
        });

        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PipelineEvent::SingleBoardFallback);
    }

    #[test]
    fn test_builtin_reporters_accept_every_event() {
        let event = PipelineEvent::WifiConflict {
            vendor: "VendorA".to_string(),
            name: "Board1".to_string(),
            kept: true,
        };
        NullReporter.report(event.clone());
        TracingReporter.report(event);
    }
}
