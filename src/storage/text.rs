//! Line-oriented board format.
//!
//! ```text
//! img/food/plate.png food
//! >img/food/icons8-french-fries-96.png french fries
//! >img/food/icons8-watermelon-96.png watermelon
//! img/clothing/hanger.png clothing
//! >img/clothing/collaredshirt.png collared shirt
//! ```
//!
//! A line without the `>` marker declares a category; a marked line adds an
//! item to the most recently declared category. Each line is split on its
//! first space, so texts may contain spaces and image ids may not.

use super::{atomic_write, MalformedLines, Storage, StorageError};
use crate::models::{BoardData, CategoryRecord, ItemRecord};
use std::path::{Path, PathBuf};
use tracing::warn;

const ITEM_MARKER: char = '>';

pub struct TextStorage {
    path: PathBuf,
    malformed: MalformedLines,
}

impl TextStorage {
    pub fn new<P: AsRef<Path>>(path: P, malformed: MalformedLines) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            malformed,
        }
    }
}

impl Storage for TextStorage {
    fn save(&self, data: &BoardData) -> Result<(), StorageError> {
        data.validate()?;
        atomic_write(&self.path, &render(data))
    }

    fn load(&self) -> Result<BoardData, StorageError> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse(&contents, self.malformed)
    }
}

/// Splits `imageId text...` on the first space.
fn split_entry(body: &str) -> Result<(&str, &str), String> {
    let (image_id, text) = body
        .split_once(' ')
        .ok_or_else(|| format!("missing space between image id and text: {:?}", body))?;
    if image_id.is_empty() {
        return Err("empty image id".to_string());
    }
    if image_id.chars().any(char::is_whitespace) {
        return Err(format!("image id contains whitespace: {:?}", image_id));
    }
    Ok((image_id, text))
}

pub fn parse(contents: &str, malformed: MalformedLines) -> Result<BoardData, StorageError> {
    let mut data = BoardData::new();

    for (index, raw) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }

        let (is_item, body) = match line.strip_prefix(ITEM_MARKER) {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let (image_id, text) = match split_entry(body) {
            Ok(entry) => entry,
            Err(reason) => match malformed {
                MalformedLines::Abort => {
                    return Err(StorageError::Parse {
                        line: line_no,
                        reason,
                    })
                }
                MalformedLines::Skip => {
                    warn!(line = line_no, %reason, "skipping malformed board line");
                    continue;
                }
            },
        };

        let item = ItemRecord {
            image_id: image_id.to_string(),
            text: text.to_string(),
        };

        if !is_item {
            data.categories.push(CategoryRecord {
                image_id: item.image_id,
                name: item.text,
                items: Vec::new(),
            });
        } else if let Some(target) = data.categories.last_mut() {
            target.items.push(item);
        } else {
            // No category declared yet, so the item is filed under home.
            warn!(line = line_no, image_id, "item appears before any category");
            data.loose_items.push(item);
        }
    }

    Ok(data)
}

pub fn render(data: &BoardData) -> String {
    let mut output = String::new();

    for item in &data.loose_items {
        output.push_str(&format!("{}{} {}\n", ITEM_MARKER, item.image_id, item.text));
    }
    for category in &data.categories {
        output.push_str(&format!("{} {}\n", category.image_id, category.name));
        for item in &category.items {
            output.push_str(&format!("{}{} {}\n", ITEM_MARKER, item.image_id, item.text));
        }
    }

    output
}
