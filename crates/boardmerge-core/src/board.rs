//! Board records and their JSON codec
//!
//! A board file is either `{"boards": [ {...}, ... ]}` or a single bare
//! board object. Only `name`, `vendor`, `core` and `has_wifi` are
//! interpreted; every other key is carried through untouched in
//! [`Board::extra`] and written back at the same level on output.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::merge::identity_key;
use crate::report::{PipelineEvent, Reporter};

const NAME: &str = "name";
const VENDOR: &str = "vendor";
const CORE: &str = "core";
const HAS_WIFI: &str = "has_wifi";
const BOARDS: &str = "boards";

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("JSON object missing critical data: board {0}")]
    MissingField(&'static str),
    #[error("board field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("'boards' must be a list of board objects")]
    InvalidBoardsList,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot merge boards with different name or vendor: '{existing}' and '{incoming}'")]
    IdentityMismatch { existing: String, incoming: String },
}

/// Whether a board is known to have WiFi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiSupport {
    /// No source said anything about WiFi
    #[default]
    Unknown,
    Present,
    Absent,
}

impl WifiSupport {
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Present => Some(true),
            Self::Absent => Some(false),
        }
    }
}

impl From<bool> for WifiSupport {
    fn from(value: bool) -> Self {
        if value {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

impl From<Option<bool>> for WifiSupport {
    fn from(value: Option<bool>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

/// One device description
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Board name, never empty
    pub name: String,
    /// Vendor name, never empty
    pub vendor: String,
    /// Processor core, `None` when no source provided a non-empty value
    pub core: Option<String>,
    pub has_wifi: WifiSupport,
    /// Every field outside the known schema, keyed by trimmed name
    pub extra: Map<String, Value>,
}

impl Board {
    /// Create a board with only its identity set
    ///
    /// Name and vendor are trimmed and must not be blank.
    pub fn new(name: impl Into<String>, vendor: impl Into<String>) -> Result<Self, BoardError> {
        Ok(Self {
            name: required(name.into(), NAME)?,
            vendor: required(vendor.into(), VENDOR)?,
            core: None,
            has_wifi: WifiSupport::Unknown,
            extra: Map::new(),
        })
    }

    /// Set the core, trimmed; a blank core clears it
    pub fn with_core(mut self, core: impl Into<String>) -> Self {
        self.core = non_blank(core.into());
        self
    }

    pub fn with_wifi(mut self, has_wifi: bool) -> Self {
        self.has_wifi = WifiSupport::from(has_wifi);
        self
    }

    /// Add an extra field under its trimmed key
    ///
    /// Known keys have typed setters and are ignored here.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into().trim().to_string();
        if !is_known_key(&key) {
            self.extra.insert(key, value.into());
        }
        self
    }

    /// Registry key for this board, `vendor::name`
    pub fn identity_key(&self) -> String {
        identity_key(&self.vendor, &self.name)
    }

    /// Build a board from a decoded JSON object
    ///
    /// Keys are trimmed first. Only exact lowercase known keys are
    /// recognized, so `"NAME"` ends up in `extra` and the board is rejected
    /// for lacking a name. Raw keys are visited in byte order, so when two
    /// of them trim to the same name the one sorting later wins.
    pub fn from_map(raw: Map<String, Value>) -> Result<Self, BoardError> {
        let mut fields: Map<String, Value> = raw
            .into_iter()
            .map(|(key, value)| (key.trim().to_string(), value))
            .collect();

        let name = take_required(&mut fields, NAME)?;
        let vendor = take_required(&mut fields, VENDOR)?;

        let core = match fields.remove(CORE) {
            None | Some(Value::Null) => None,
            Some(Value::String(core)) => non_blank(core),
            Some(_) => {
                return Err(BoardError::InvalidField {
                    field: CORE,
                    expected: "a string",
                })
            }
        };

        let has_wifi = match fields.remove(HAS_WIFI) {
            None | Some(Value::Null) => WifiSupport::Unknown,
            Some(Value::Bool(flag)) => WifiSupport::from(flag),
            Some(_) => {
                return Err(BoardError::InvalidField {
                    field: HAS_WIFI,
                    expected: "a boolean",
                })
            }
        };

        Ok(Self {
            name,
            vendor,
            core,
            has_wifi,
            extra: fields,
        })
    }

    /// Fold another description of the same board into this one
    ///
    /// Values already present here win for `core` and `has_wifi`; a
    /// disagreement is reported, never fatal. Extra fields from `other`
    /// overwrite ours key by key.
    pub fn merge(&mut self, other: Board, reporter: &dyn Reporter) -> Result<(), BoardError> {
        if self.name != other.name || self.vendor != other.vendor {
            return Err(BoardError::IdentityMismatch {
                existing: self.identity_key(),
                incoming: other.identity_key(),
            });
        }

        if let Some(incoming) = other.core {
            match &self.core {
                Some(existing) if *existing != incoming => {
                    reporter.report(PipelineEvent::CoreConflict {
                        vendor: self.vendor.clone(),
                        name: self.name.clone(),
                        kept: existing.clone(),
                        rejected: incoming,
                    });
                }
                Some(_) => {}
                None => self.core = Some(incoming),
            }
        }

        match (self.has_wifi, other.has_wifi) {
            (WifiSupport::Unknown, incoming) => self.has_wifi = incoming,
            (existing, incoming) if incoming.is_known() && existing != incoming => {
                reporter.report(PipelineEvent::WifiConflict {
                    vendor: self.vendor.clone(),
                    name: self.name.clone(),
                    kept: existing == WifiSupport::Present,
                });
            }
            _ => {}
        }

        self.extra.extend(other.extra);

        Ok(())
    }
}

fn take_required(fields: &mut Map<String, Value>, key: &'static str) -> Result<String, BoardError> {
    match fields.remove(key) {
        Some(Value::String(value)) => required(value, key),
        _ => Err(BoardError::MissingField(key)),
    }
}

fn required(value: String, key: &'static str) -> Result<String, BoardError> {
    non_blank(value).ok_or(BoardError::MissingField(key))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_known_key(key: &str) -> bool {
    matches!(key, NAME | VENDOR | CORE | HAS_WIFI)
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(NAME, &self.name)?;
        map.serialize_entry(VENDOR, &self.vendor)?;
        if let Some(core) = self.core.as_deref().filter(|core| !core.is_empty()) {
            map.serialize_entry(CORE, core)?;
        }
        if let Some(has_wifi) = self.has_wifi.as_bool() {
            map.serialize_entry(HAS_WIFI, &has_wifi)?;
        }
        for (key, value) in self.extra.iter().filter(|(key, _)| !is_known_key(key)) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Board::from_map(raw).map_err(de::Error::custom)
    }
}

/// Decode the content of one board file
///
/// A non-empty `boards` list wins; invalid entries in it are reported and
/// skipped. Without such a list the whole document must be one valid board.
pub fn decode_boards(data: &[u8], reporter: &dyn Reporter) -> Result<Vec<Board>, BoardError> {
    let root: Value = serde_json::from_slice(data)?;
    let Value::Object(mut document) = root else {
        return Err(BoardError::NotAnObject);
    };

    match document.get_mut(BOARDS) {
        Some(Value::Array(entries)) if !entries.is_empty() => {
            let entries = std::mem::take(entries);
            return Ok(decode_list(entries, reporter));
        }
        None | Some(Value::Null) | Some(Value::Array(_)) => {}
        Some(_) => return Err(BoardError::InvalidBoardsList),
    }

    reporter.report(PipelineEvent::SingleBoardFallback);
    let board = Board::from_map(document)?;
    Ok(vec![board])
}

fn decode_list(entries: Vec<Value>, reporter: &dyn Reporter) -> Vec<Board> {
    let mut boards = Vec::with_capacity(entries.len());
    for entry in entries {
        let decoded = match entry {
            Value::Object(raw) => Board::from_map(raw),
            _ => Err(BoardError::NotAnObject),
        };
        match decoded {
            Ok(board) => boards.push(board),
            Err(e) => reporter.report(PipelineEvent::BoardSkipped {
                error: e.to_string(),
            }),
        }
    }
    boards
}
