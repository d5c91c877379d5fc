use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    /// A recognized save file could not be decoded.
    FileParse,
    /// The directory holds no character save or stash file.
    FilesNotFound,
    /// Reference data is missing or does not have the expected shape.
    Catalog,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn file_parse(path: &Path, message: impl std::fmt::Display) -> Self {
        Self {
            code: CoreErrorCode::FileParse,
            message: format!("{}: {message}", path.display()),
            path: Some(path.to_path_buf()),
        }
    }

    pub fn files_not_found(dir: &Path) -> Self {
        Self {
            code: CoreErrorCode::FilesNotFound,
            message: format!("{} does not contain Diablo 2 files", dir.display()),
            path: Some(dir.to_path_buf()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
