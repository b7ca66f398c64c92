use crate::models::{BoardData, CategoryRecord, ItemRecord};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SAMPLE_BOARD: &str = "\
img/food/plate.png food
>img/food/icons8-french-fries-96.png french fries
>img/food/icons8-watermelon-96.png watermelon
img/clothing/hanger.png clothing
>img/clothing/collaredshirt.png collared shirt
";

/// Temporary directory that is removed when dropped.
pub struct TestDir {
    temp_dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let temp_dir = tempfile::Builder::new()
            .prefix("aacboard_test")
            .tempdir()
            .expect("Failed to create temporary directory");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` to `name` inside the directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }
}

fn item(image_id: &str, text: &str) -> ItemRecord {
    ItemRecord {
        image_id: image_id.to_string(),
        text: text.to_string(),
    }
}

/// Same content as `SAMPLE_BOARD`.
pub fn sample_data() -> BoardData {
    let mut data = BoardData::new();
    data.categories.push(CategoryRecord {
        image_id: "img/food/plate.png".to_string(),
        name: "food".to_string(),
        items: vec![
            item("img/food/icons8-french-fries-96.png", "french fries"),
            item("img/food/icons8-watermelon-96.png", "watermelon"),
        ],
    });
    data.categories.push(CategoryRecord {
        image_id: "img/clothing/hanger.png".to_string(),
        name: "clothing".to_string(),
        items: vec![item("img/clothing/collaredshirt.png", "collared shirt")],
    });
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::text::parse;
    use crate::storage::MalformedLines;

    #[test]
    fn test_sample_data_matches_sample_board() {
        assert_eq!(parse(SAMPLE_BOARD, MalformedLines::Abort).unwrap(), sample_data());
    }

    #[test]
    fn test_dir_write() {
        let dir = TestDir::new();
        let path = dir.write("board.txt", SAMPLE_BOARD);
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), SAMPLE_BOARD);
    }
}
