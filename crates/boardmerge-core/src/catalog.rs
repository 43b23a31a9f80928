//! Merged board catalog, the document every run produces

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::board::Board;

/// Aggregate counts over the merged boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub unique_vendors: usize,
    pub total_boards: usize,
}

/// Deduplicated boards sorted by `vendor::name`, plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCatalog {
    pub boards: Vec<Board>,
    #[serde(rename = "_metadata")]
    pub metadata: CatalogMetadata,
}

impl BoardCatalog {
    /// Build a catalog from registry entries keyed by identity
    ///
    /// Entries are ordered by plain byte-wise comparison of their keys, so
    /// the output does not depend on file or insertion order.
    pub fn assemble(registry: HashMap<String, Board>, unique_vendors: usize) -> Self {
        let mut entries: Vec<(String, Board)> = registry.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let boards: Vec<Board> = entries.into_iter().map(|(_, board)| board).collect();
        let total_boards = boards.len();

        Self {
            boards,
            metadata: CatalogMetadata {
                unique_vendors,
                total_boards,
            },
        }
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
