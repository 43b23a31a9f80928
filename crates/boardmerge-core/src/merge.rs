//! Merge engine: folds board files into one deduplicated registry
//!
//! Files are processed strictly in the order given. Each decoded board is
//! keyed by `vendor::name`; a board whose key is already registered is
//! merged into the registered one, so the first file to mention a board
//! decides its `core` and `has_wifi` when sources disagree.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

use crate::board::{decode_boards, Board};
use crate::catalog::BoardCatalog;
use crate::report::{PipelineEvent, Reporter};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("no valid boards found")]
    NoValidBoards,
}

/// Registry key for a board identity
///
/// Plain concatenation: a vendor or name that itself contains `::` can
/// collide with another pair.
pub fn identity_key(vendor: &str, name: &str) -> String {
    format!("{}::{}", vendor, name)
}

/// Running set of unique boards plus the vendors seen so far
#[derive(Debug, Default)]
pub struct BoardRegistry {
    boards: HashMap<String, Board>,
    vendors: BTreeSet<String>,
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a board, merging it into an existing entry with the same identity
    pub fn insert(&mut self, board: Board, reporter: &dyn Reporter) {
        self.vendors.insert(board.vendor.clone());

        let key = board.identity_key();
        match self.boards.get_mut(&key) {
            Some(existing) => {
                reporter.report(PipelineEvent::DuplicateBoard {
                    vendor: board.vendor.clone(),
                    name: board.name.clone(),
                });
                if let Err(e) = existing.merge(board, reporter) {
                    reporter.report(PipelineEvent::MergeFailed {
                        key,
                        error: e.to_string(),
                    });
                }
            }
            None => {
                self.boards.insert(key, board);
            }
        }
    }

    /// Read, decode and register every board in one file
    ///
    /// Unreadable or undecodable files are reported and contribute nothing.
    pub fn ingest_file(&mut self, path: &Path, reporter: &dyn Reporter) {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                reporter.report(PipelineEvent::FileReadFailed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
                return;
            }
        };

        reporter.report(PipelineEvent::FileParsing {
            path: path.to_path_buf(),
        });

        let boards = match decode_boards(&data, reporter) {
            Ok(boards) => boards,
            Err(e) => {
                reporter.report(PipelineEvent::FileDecodeFailed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
                return;
            }
        };

        for board in boards {
            self.insert(board, reporter);
        }
    }

    /// Consume the registry into a catalog sorted by identity key
    pub fn into_catalog(self) -> Result<BoardCatalog, MergeError> {
        if self.boards.is_empty() {
            return Err(MergeError::NoValidBoards);
        }
        let unique_vendors = self.vendors.len();
        Ok(BoardCatalog::assemble(self.boards, unique_vendors))
    }
}

/// Merge all board files into one catalog
pub fn merge_all<P: AsRef<Path>>(
    paths: &[P],
    reporter: &dyn Reporter,
) -> Result<BoardCatalog, MergeError> {
    let mut registry = BoardRegistry::new();
    for path in paths {
        registry.ingest_file(path.as_ref(), reporter);
    }
    registry.into_catalog()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::WifiSupport;
    use crate::report::testing::RecordingReporter;
    use crate::report::NullReporter;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, content: &str) -> PathBuf {
        let path = dir.path().join(file);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_identity_key() {
        assert_eq!(identity_key("VendorA", "Board1"), "VendorA::Board1");
    }

    #[test]
    fn test_unique_boards_with_extra_entries() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "boards-1.json",
            r#"{
                "boards": [
                    {"name": "Board2", "vendor": "VendorB", "has_wifi": true, "extra_feature_1": "yes"},
                    {"name": "Board1", "vendor": "VendorA", "has_wifi": false, "extra_feature_1": "no", "extra_feature_2": "yes"}
                ]
            }"#,
        );

        let catalog = merge_all(&[path], &NullReporter).unwrap();

        assert_eq!(
            catalog.boards,
            vec![
                Board::new("Board1", "VendorA").unwrap()
                    .with_wifi(false)
                    .with_extra("extra_feature_1", "no")
                    .with_extra("extra_feature_2", "yes"),
                Board::new("Board2", "VendorB").unwrap()
                    .with_wifi(true)
                    .with_extra("extra_feature_1", "yes"),
            ]
        );
        assert_eq!(catalog.metadata.unique_vendors, 2);
        assert_eq!(catalog.metadata.total_boards, 2);
    }

    #[test]
    fn test_single_board_files() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "boards-1.json", r#"{"name": "Board2", "vendor": "VendorB", "has_wifi": true}"#);
        let second = write(&dir, "boards-2.json", r#"{"name": "Board1", "vendor": "VendorA", "has_wifi": false}"#);

        let catalog = merge_all(&[first, second], &NullReporter).unwrap();

        assert_eq!(
            catalog.boards,
            vec![
                Board::new("Board1", "VendorA").unwrap().with_wifi(false),
                Board::new("Board2", "VendorB").unwrap().with_wifi(true),
            ]
        );
        assert_eq!(catalog.metadata.total_boards, 2);
        assert_eq!(catalog.metadata.unique_vendors, 2);
    }

    #[test]
    fn test_empty_boards_list() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "boards-1.json", r#"{ "boards": [ ] }"#);

        let err = merge_all(&[path], &NullReporter).unwrap_err();
        assert!(matches!(err, MergeError::NoValidBoards));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "boards-1.json", "}");

        let reporter = RecordingReporter::default();
        let err = merge_all(&[path.clone()], &reporter).unwrap_err();

        assert!(matches!(err, MergeError::NoValidBoards));
        assert!(reporter
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::FileDecodeFailed { path: p, .. } if *p == path)));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boards-1.json");

        let reporter = RecordingReporter::default();
        let err = merge_all(&[path.clone()], &reporter).unwrap_err();

        assert!(matches!(err, MergeError::NoValidBoards));
        assert!(matches!(
            reporter.events().first(),
            Some(PipelineEvent::FileReadFailed { path: p, .. }) if *p == path
        ));
    }

    #[test]
    fn test_bad_file_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "a.json", "{ not json");
        let good = write(&dir, "b.json", r#"{"name": "Board1", "vendor": "VendorA"}"#);

        let catalog = merge_all(&[broken, good], &NullReporter).unwrap();
        assert_eq!(catalog.metadata.total_boards, 1);
    }

    #[test]
    fn test_invalid_board_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "boards-1.json",
            r#"{
                "boards": [
                    {"name": "Board1", "vendor": "VendorA", "has_wifi": false},
                    {"NAME": "Board1", "vendor": "VendorA", "has_wifi": false}
                ]
            }"#,
        );

        let catalog = merge_all(&[path], &NullReporter).unwrap();

        assert_eq!(catalog.boards, vec![Board::new("Board1", "VendorA").unwrap().with_wifi(false)]);
        assert_eq!(catalog.metadata.unique_vendors, 1);
        assert_eq!(catalog.metadata.total_boards, 1);
    }

    #[test]
    fn test_duplicate_boards_with_conflict() {
        let dir = TempDir::new().unwrap();
        let first = write(
            &dir,
            "boards-1.json",
            r#"{
                "boards": [
                    {"name": "Board2", "vendor": "VendorB", "has_wifi": true},
                    {"name": "Board1", "vendor": "VendorA", "core": "CoreY", "has_wifi": false, "extra_feature_1": "yes"}
                ]
            }"#,
        );
        let second = write(
            &dir,
            "boards-2.json",
            r#"{
                "boards": [
                    {"name": "Board3", "vendor": "VendorB", "core": "CoreZ"},
                    {"name": "Board1", "vendor": "VendorA", "core": "CoreX", "has_wifi": false, "extra_feature_2": "no"}
                ]
            }"#,
        );

        let reporter = RecordingReporter::default();
        let catalog = merge_all(&[first, second], &reporter).unwrap();

        assert_eq!(
            catalog.boards,
            vec![
                Board::new("Board1", "VendorA").unwrap()
                    .with_core("CoreY")
                    .with_wifi(false)
                    .with_extra("extra_feature_1", "yes")
                    .with_extra("extra_feature_2", "no"),
                Board::new("Board2", "VendorB").unwrap().with_wifi(true),
                Board::new("Board3", "VendorB").unwrap().with_core("CoreZ"),
            ]
        );
        assert_eq!(catalog.metadata.unique_vendors, 2);
        assert_eq!(catalog.metadata.total_boards, 3);

        let events = reporter.events();
        assert!(events.contains(&PipelineEvent::DuplicateBoard {
            vendor: "VendorA".to_string(),
            name: "Board1".to_string(),
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::CoreConflict { kept, rejected, .. } if kept == "CoreY" && rejected == "CoreX")));
        assert!(!events.iter().any(|e| matches!(e, PipelineEvent::WifiConflict { .. })));
    }

    #[test]
    fn test_total_counts_identities_not_entries() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| {
                write(
                    &dir,
                    &format!("copy-{i}.json"),
                    &json!({"name": "Board1", "vendor": "VendorA", "revision": i}).to_string(),
                )
            })
            .collect();

        let catalog = merge_all(&paths, &NullReporter).unwrap();

        assert_eq!(catalog.metadata.total_boards, 1);
        assert_eq!(catalog.metadata.unique_vendors, 1);
        assert_eq!(catalog.boards[0].extra.get("revision"), Some(&json!(2)));
    }

    #[test]
    fn test_registry_fills_unknown_wifi_from_later_files() {
        let mut registry = BoardRegistry::new();
        registry.insert(Board::new("Board1", "VendorA").unwrap(), &NullReporter);
        registry.insert(Board::new("Board1", "VendorA").unwrap().with_wifi(true), &NullReporter);
        registry.insert(Board::new("Board9", "VendorA").unwrap().with_wifi(false), &NullReporter);

        let catalog = registry.into_catalog().unwrap();
        assert_eq!(catalog.metadata.total_boards, 2);
        assert_eq!(catalog.metadata.unique_vendors, 1);
        assert_eq!(catalog.boards[0].name, "Board1");
        assert_eq!(catalog.boards[0].has_wifi, WifiSupport::Present);
    }

    #[test]
    fn test_empty_registry_has_no_catalog() {
        assert!(matches!(
            BoardRegistry::new().into_catalog(),
            Err(MergeError::NoValidBoards)
        ));
    }
}
