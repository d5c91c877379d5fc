//! Boundary to the save-file decoder.
//!
//! The aggregation engine never reads `.d2s`/`.d2x`/`.sss` bytes itself. A
//! [`SaveDecoder`] turns each recognized file into the record types below;
//! everything past that point is pure item bookkeeping.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `.d2s` character save.
    Character,
    /// `.d2x` PlugY personal stash.
    PersonalStash,
    /// `.sss` PlugY shared stash.
    SharedStash,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [
        FileKind::Character,
        FileKind::PersonalStash,
        FileKind::SharedStash,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Character => "d2s",
            FileKind::PersonalStash => "d2x",
            FileKind::SharedStash => "sss",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Character => "character",
            FileKind::PersonalStash => "personal_stash",
            FileKind::SharedStash => "shared_stash",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    pub fn is_stash(self) -> bool {
        !matches!(self, FileKind::Character)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single item as seen by the decoder.
///
/// `set_id` is present only for set items and `unique_id` only for unique
/// items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub socketed_items: Vec<ItemRecord>,
}

impl ItemRecord {
    pub fn set(set_id: u32, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_id: Some(set_id),
            ..Self::default()
        }
    }

    pub fn unique(unique_id: u32, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: Some(unique_id),
            ..Self::default()
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_sockets(mut self, socketed_items: Vec<ItemRecord>) -> Self {
        self.socketed_items = socketed_items;
        self
    }

    pub fn is_set_item(&self) -> bool {
        self.set_id.is_some()
    }

    pub fn is_unique_item(&self) -> bool {
        self.unique_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterSave {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    /// Items left on the ground when the character died.
    #[serde(default)]
    pub corpse_items: Vec<ItemRecord>,
    #[serde(default)]
    pub merc_items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StashPage {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StashFile {
    #[serde(default)]
    pub stash: Vec<StashPage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait SaveDecoder {
    fn decode_character(&self, path: &Path) -> Result<CharacterSave, DecodeError>;

    /// `kind` is always one of the stash kinds.
    fn decode_stash(&self, kind: FileKind, path: &Path) -> Result<StashFile, DecodeError>;
}

impl<D: SaveDecoder + ?Sized> SaveDecoder for &D {
    fn decode_character(&self, path: &Path) -> Result<CharacterSave, DecodeError> {
        (**self).decode_character(path)
    }

    fn decode_stash(&self, kind: FileKind, path: &Path) -> Result<StashFile, DecodeError> {
        (**self).decode_stash(kind, path)
    }
}
