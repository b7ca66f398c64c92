use serde::{Deserialize, Serialize};
use thiserror::Error;

mod image_map;
pub use image_map::ImageMap;

pub const DATA_VERSION: u32 = 1;

/// A named, flat set of image to spoken-text bindings.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    items: ImageMap<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: ImageMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Binds `image_id` to `text`; an existing binding is overwritten.
    pub fn add_item(&mut self, image_id: impl Into<String>, text: impl Into<String>) {
        self.items.set(image_id, text.into());
    }

    /// Image identifiers in insertion order.
    pub fn image_ids(&self) -> Vec<String> {
        self.items.keys().map(str::to_string).collect()
    }

    pub fn select(&self, image_id: &str) -> Result<&str, CategoryError> {
        self.items
            .get(image_id)
            .map(String::as_str)
            .ok_or_else(|| CategoryError::ImageNotFound(image_id.to_string()))
    }

    pub fn has_image(&self, image_id: &str) -> bool {
        self.items.contains_key(image_id)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Image not found in category: {0}")]
    ImageNotFound(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Items can only be registered inside a category, the board is at home")]
    NoActiveCategory,
    #[error("Unknown category image: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub image_id: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub image_id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

/// Serializable snapshot of a whole board, in registration order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BoardData {
    pub version: u32, // Schema version for future migrations
    /// Items filed directly under home because they preceded every category.
    #[serde(default)]
    pub loose_items: Vec<ItemRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

impl Default for BoardData {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardData {
    pub fn new() -> Self {
        Self {
            version: DATA_VERSION,
            loose_items: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Checks that every id and text can be written back as a single line.
    pub fn validate(&self) -> Result<(), StorageError> {
        for item in &self.loose_items {
            validate_image_id(&item.image_id)?;
            validate_text(&item.text)?;
        }
        for category in &self.categories {
            validate_image_id(&category.image_id)?;
            if category.image_id.starts_with('>') {
                return Err(StorageError::InvalidData(format!(
                    "category image id cannot start with '>': {}",
                    category.image_id
                )));
            }
            validate_text(&category.name)?;
            for item in &category.items {
                validate_image_id(&item.image_id)?;
                validate_text(&item.text)?;
            }
        }
        Ok(())
    }
}

fn validate_image_id(image_id: &str) -> Result<(), StorageError> {
    if image_id.is_empty() {
        return Err(StorageError::InvalidData(
            "image id cannot be empty".to_string(),
        ));
    }
    if image_id.chars().any(char::is_whitespace) {
        return Err(StorageError::InvalidData(format!(
            "image id cannot contain whitespace: {:?}",
            image_id
        )));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), StorageError> {
    if text.contains('\n') || text.contains('\r') {
        return Err(StorageError::InvalidData(format!(
            "text cannot contain line breaks: {:?}",
            text
        )));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
