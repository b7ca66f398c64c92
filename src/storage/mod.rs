use crate::models::BoardData;
pub use crate::models::StorageError;
use std::io::Write;
use std::path::Path;

pub mod json;
pub mod text;

#[cfg(test)]
pub(crate) mod test_utils;

pub use json::JsonStorage;
pub use text::TextStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Text,
    Json,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(StorageType::Text),
            "json" => Some(StorageType::Json),
            _ => None,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            StorageType::Text => "text",
            StorageType::Json => "json",
        }
    }

    /// `.json` files are JSON, everything else uses the line format.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StorageType::Json,
            _ => StorageType::Text,
        }
    }
}

/// What the line parser does with a line it cannot understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLines {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Log a warning, drop the line and keep parsing.
    Skip,
}

impl MalformedLines {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Some(MalformedLines::Abort),
            "skip" => Some(MalformedLines::Skip),
            _ => None,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            MalformedLines::Abort => "abort",
            MalformedLines::Skip => "skip",
        }
    }
}

pub trait Storage {
    fn save(&self, data: &BoardData) -> Result<(), StorageError>;
    fn load(&self) -> Result<BoardData, StorageError>;
}

pub fn create_storage(
    storage_type: StorageType,
    path: &Path,
    malformed: MalformedLines,
) -> Box<dyn Storage> {
    match storage_type {
        StorageType::Text => Box::new(TextStorage::new(path, malformed)),
        StorageType::Json => Box::new(JsonStorage::new(path)),
    }
}

/// Writes `contents` next to `path` and renames it into place, so readers
/// never see a half-written board.
pub(crate) fn atomic_write(path: &Path, contents: &str) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}
