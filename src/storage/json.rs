use super::{atomic_write, Storage, StorageError};
use crate::models::{BoardData, DATA_VERSION};
use std::path::{Path, PathBuf};

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Storage for JsonStorage {
    fn save(&self, data: &BoardData) -> Result<(), StorageError> {
        // Keep exported boards convertible back to the line format
        data.validate()?;

        let json = serde_json::to_string_pretty(data)?;
        atomic_write(&self.path, &json)
    }

    fn load(&self) -> Result<BoardData, StorageError> {
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BoardData::new());
        }

        let data: BoardData = serde_json::from_str(&contents)?;
        if data.version > DATA_VERSION {
            return Err(StorageError::Storage(format!(
                "unsupported board version {} (newest known is {})",
                data.version, DATA_VERSION
            )));
        }
        data.validate()?;
        Ok(data)
    }
}
